use rand::Rng;
use serde::{Deserialize, Serialize};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Los_Angeles",
    "America/Chicago",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Australia/Sydney",
];

const LANGUAGES: &[&str] = &["en-US", "en-GB", "de-DE", "fr-FR", "es-ES", "zh-CN"];

// Width and height are drawn as a pair so the advertised screen is a real
// desktop resolution.
const RESOLUTIONS: &[(u32, u32)] = &[
    (1920, 1080),
    (1366, 768),
    (1440, 900),
    (1600, 1024),
    (2560, 1440),
];

const PIXEL_RATIOS: &[f64] = &[1.0, 1.25, 1.5, 2.0];

const WEBGL_ADAPTERS: &[(&str, &str)] = &[
    ("Intel Inc.", "Intel Iris OpenGL Engine"),
    ("NVIDIA Corporation", "NVIDIA GeForce GTX 1660/PCIe/SSE2"),
    ("ATI Technologies Inc.", "AMD Radeon Pro 5500M OpenGL Engine"),
    ("Google Inc. (Intel)", "ANGLE (Intel, Mesa Intel(R) UHD Graphics 630)"),
];

/// RGB seed for the low-probability canvas readback perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSeed {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebglInfo {
    pub vendor: String,
    pub renderer: String,
}

/// A randomized set of surface attributes a profile presents to websites.
/// Generated once per profile and persisted so the identity is stable
/// across launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub user_agent: String,
    pub language: String,
    pub timezone: String,
    /// Minutes west of UTC, as reported by `Date.getTimezoneOffset`.
    pub timezone_offset: i32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub device_pixel_ratio: f64,
    pub canvas: CanvasSeed,
    pub webgl: WebglInfo,
    /// Advertised `navigator.plugins` length.
    pub plugins: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_track: Option<String>,
}

impl Fingerprint {
    /// Draws every attribute independently from its pool.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let (screen_width, screen_height) = *pick(&mut rng, RESOLUTIONS);
        let (vendor, renderer) = *pick(&mut rng, WEBGL_ADAPTERS);
        Fingerprint {
            user_agent: pick(&mut rng, USER_AGENTS).to_string(),
            language: pick(&mut rng, LANGUAGES).to_string(),
            timezone: pick(&mut rng, TIMEZONES).to_string(),
            timezone_offset: rng.random_range(-720..=720),
            screen_width,
            screen_height,
            device_pixel_ratio: *pick(&mut rng, PIXEL_RATIOS),
            canvas: CanvasSeed {
                r: rng.random(),
                g: rng.random(),
                b: rng.random(),
            },
            webgl: WebglInfo {
                vendor: vendor.to_string(),
                renderer: renderer.to_string(),
            },
            plugins: rng.random_range(0..=3),
            do_not_track: rng.random_bool(0.5).then(|| "1".to_string()),
        }
    }

    /// Renders the script injected before any page script runs. It pins the
    /// navigator, screen, canvas and timezone surfaces to this fingerprint.
    pub fn evasion_script(&self) -> String {
        let base_language = self.language.split('-').next().unwrap_or(&self.language);
        format!(
            r#"(() => {{
  const spoof = (obj, prop, value) => {{
    try {{
      Object.defineProperty(obj, prop, {{ get: () => value }});
    }} catch (e) {{}}
  }};
  spoof(navigator, 'userAgent', '{user_agent}');
  spoof(navigator, 'language', '{language}');
  spoof(navigator, 'languages', ['{language}', '{base_language}']);
  spoof(navigator, 'plugins', {{ length: {plugins} }});
  spoof(screen, 'width', {width});
  spoof(screen, 'height', {height});
  spoof(screen, 'availWidth', {width});
  spoof(screen, 'availHeight', {avail_height});
  spoof(window, 'devicePixelRatio', {pixel_ratio});
  const origToDataURL = HTMLCanvasElement.prototype.toDataURL;
  HTMLCanvasElement.prototype.toDataURL = function (...args) {{
    if (Math.random() > 0.9) {{
      const ctx = this.getContext('2d');
      if (ctx) {{
        ctx.fillStyle = 'rgb({r}, {g}, {b})';
        ctx.fillRect(0, 0, 10, 10);
      }}
    }}
    return origToDataURL.apply(this, args);
  }};
  Date.prototype.getTimezoneOffset = function () {{
    return {offset};
  }};
}})();"#,
            user_agent = self.user_agent,
            language = self.language,
            base_language = base_language,
            plugins = self.plugins,
            width = self.screen_width,
            height = self.screen_height,
            avail_height = self.screen_height.saturating_sub(40),
            pixel_ratio = self.device_pixel_ratio,
            r = self.canvas.r,
            g = self.canvas.g,
            b = self.canvas.b,
            offset = self.timezone_offset,
        )
    }
}

fn pick<'a, T, R: Rng>(rng: &mut R, pool: &'a [T]) -> &'a T {
    &pool[rng.random_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_attributes_come_from_the_pools() {
        for _ in 0..50 {
            let fp = Fingerprint::generate();
            assert!(USER_AGENTS.contains(&fp.user_agent.as_str()));
            assert!(TIMEZONES.contains(&fp.timezone.as_str()));
            assert!(LANGUAGES.contains(&fp.language.as_str()));
            assert!(RESOLUTIONS.contains(&(fp.screen_width, fp.screen_height)));
            assert!(PIXEL_RATIOS.contains(&fp.device_pixel_ratio));
            assert!(fp.plugins <= 3);
            assert!((-720..=720).contains(&fp.timezone_offset));
            assert!(
                WEBGL_ADAPTERS
                    .iter()
                    .any(|(v, r)| *v == fp.webgl.vendor && *r == fp.webgl.renderer)
            );
            match fp.do_not_track.as_deref() {
                None | Some("1") => {}
                other => panic!("unexpected doNotTrack value: {other:?}"),
            }
        }
    }

    #[test]
    fn consecutive_fingerprints_differ() {
        let first = Fingerprint::generate();
        assert!((0..8).map(|_| Fingerprint::generate()).any(|fp| fp != first));
    }

    #[test]
    fn evasion_script_pins_every_surface() {
        let fp = Fingerprint::generate();
        let script = fp.evasion_script();
        assert!(script.contains(&fp.user_agent));
        assert!(script.contains("'languages'"));
        assert!(script.contains(&format!("spoof(screen, 'width', {})", fp.screen_width)));
        assert!(script.contains(&format!(
            "'availHeight', {}",
            fp.screen_height - 40
        )));
        assert!(script.contains("toDataURL"));
        assert!(script.contains(&format!(
            "rgb({}, {}, {})",
            fp.canvas.r, fp.canvas.g, fp.canvas.b
        )));
        assert!(script.contains("getTimezoneOffset"));
        assert!(script.contains(&format!("return {};", fp.timezone_offset)));
    }

    #[test]
    fn fingerprint_serializes_with_camel_case_keys() {
        let fp = Fingerprint::generate();
        let json = serde_json::to_string(&fp).unwrap();
        assert!(json.contains("\"userAgent\""));
        assert!(json.contains("\"timezoneOffset\""));
        assert!(json.contains("\"devicePixelRatio\""));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}
