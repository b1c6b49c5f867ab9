/// Geographic position in degrees (WGS84). Values are not range-checked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The Kaaba, Mecca.
pub const KAABA: Coordinate = Coordinate::new(21.4225, 39.8262);

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from
/// north, in `[0, 360)`.
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    // `+ 0.0` clears negative zeros so that (0, 0) and (-0, -0) give 0, not 180.
    let y = dlon.sin() * lat2.cos() + 0.0;
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos() + 0.0;

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

pub fn qibla_bearing(from: Coordinate) -> f64 {
    initial_bearing(from, KAABA)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn due_east_along_equator() {
        let bearing = initial_bearing(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 90.0));
        assert!((bearing - 90.0).abs() < EPS, "got {bearing}");
    }

    #[test]
    fn due_north_to_pole() {
        let bearing = initial_bearing(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        assert!(bearing.abs() < EPS, "got {bearing}");
    }

    #[test]
    fn due_west_and_south() {
        let west = initial_bearing(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, -45.0));
        let south = initial_bearing(Coordinate::new(10.0, 20.0), Coordinate::new(-10.0, 20.0));
        assert!((west - 270.0).abs() < EPS, "got {west}");
        assert!((south - 180.0).abs() < EPS, "got {south}");
    }

    #[test]
    fn same_point_is_zero() {
        for point in [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(51.5074, -0.1278),
            KAABA,
            Coordinate::new(-33.8688, 151.2093),
        ] {
            assert_eq!(initial_bearing(point, point), 0.0);
        }
        assert_eq!(
            initial_bearing(Coordinate::new(0.0, 0.0), Coordinate::new(-0.0, -0.0)),
            0.0
        );
    }

    #[test]
    fn bearing_stays_in_range() {
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let from = Coordinate::new(lat, lon);
                for to in [KAABA, Coordinate::new(-lat, -lon), Coordinate::new(lat, lon + 1e-12)] {
                    let bearing = initial_bearing(from, to);
                    assert!((0.0..360.0).contains(&bearing), "{from:?} -> {to:?} = {bearing}");
                }
                lon += 7.5;
            }
            lat += 7.5;
        }
    }

    #[test]
    fn qibla_from_known_cities() {
        let london = qibla_bearing(Coordinate::new(51.5074, -0.1278));
        let jakarta = qibla_bearing(Coordinate::new(-6.2088, 106.8456));
        assert!((london - 119.0).abs() < 0.5, "london {london}");
        assert!((jakarta - 295.0).abs() < 0.5, "jakarta {jakarta}");
    }
}
