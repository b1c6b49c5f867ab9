/// Static settings for the offline gateway.
///
/// `cache_name` is the only version marker. Bumping it makes the next install
/// populate a fresh store; the previous store is left to the browser's quota
/// eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    pub cache_name: &'static str,
    pub manifest: &'static [&'static str],
    pub fallback_path: &'static str,
    pub notification_icon: &'static str,
    pub default_title: &'static str,
}

const PRECACHE_URLS: [&str; 8] = [
    "/",
    "/index.html",
    "/qibla_mini_app.js",
    "/qibla_mini_app_bg.wasm",
    "/sw_bootstrap.js",
    "/sw/qibla_sw.js",
    "/sw/qibla_sw_bg.wasm",
    "/icons/icon-192.png",
];

impl GatewayConfig {
    pub const DEFAULT: GatewayConfig = GatewayConfig {
        cache_name: "qibla-static-v1",
        manifest: &PRECACHE_URLS,
        fallback_path: "/",
        notification_icon: "/icons/icon-192.png",
        default_title: "Qibla",
    };
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_precached() {
        let config = GatewayConfig::default();
        assert!(config.manifest.contains(&config.fallback_path));
        assert!(config.manifest.contains(&config.notification_icon));
    }
}
