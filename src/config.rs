// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Resolved configuration.

[`Configuration`] is an immutable value consumed when a [`crate::images::FrameDriver`] is
built.  It is resolved from key/value pairs by [`Configuration::from_lookup`], which takes
any lookup function so that nothing here reads process-wide state.
[`Configuration::from_env`] is the lookup over the process environment.

| Key      | Meaning                                             | Default                       |
|----------|-----------------------------------------------------|-------------------------------|
| `LIVE`   | re-record every frame (`1`, `y`, `Y`)               | off                           |
| `FLIP`   | mirror each strip horizontally                      | off                           |
| `DEPTH`  | record through the depth-only path                  | off                           |
| `TIME`   | seconds for the reveal to complete (> 0)            | 20                            |
| `WIDTH`  | canvas width in pixels (> 0)                        | 1920                          |
| `HEIGHT` | canvas height in pixels (> 0)                       | 1080                          |
| `TESTS`  | comma-separated variant tokens                      | single triangle, quad as strip|
| `GPU`    | adapter index or exact adapter name                 | system default                |

Numbers are read from their leading digits, so `TIME=5s` is five seconds.  Empty
`TESTS` tokens are skipped.
*/

use std::str::FromStr;

use crate::pixel_formats::OutputKind;
use crate::variant::TestVariant;

/// Canvas dimensions in pixels.  Both are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    width: u32,
    height: u32,
}

impl CanvasSize {
    /// # Panics
    /// If either dimension is zero.
    pub const fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "canvas dimensions must be non-zero");
        CanvasSize { width, height }
    }
    pub const fn width(&self) -> u32 {
        self.width
    }
    pub const fn height(&self) -> u32 {
        self.height
    }
    /// Number of pixels, which is also one past the largest order index a full-coverage
    /// draw can produce.
    pub const fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    live: bool,
    flip: bool,
    output: OutputKind,
    reveal_seconds: f32,
    canvas_size: CanvasSize,
    variants: Vec<TestVariant>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            live: false,
            flip: false,
            output: OutputKind::Color,
            reveal_seconds: 20.0,
            canvas_size: CanvasSize::new(1920, 1080),
            variants: TestVariant::DEFAULT_PAIR.to_vec(),
        }
    }
}

impl Configuration {
    /**
    Resolves a configuration from a key/value lookup.

    Values that do not parse, or that are out of range, leave the default in place.
    Unrecognized variant tokens are logged and dropped; if no token survives, the default
    pair is kept.
    */
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Configuration::default();
        if let Some(value) = lookup("LIVE") {
            config.live = parse_flag(&value);
        }
        if let Some(value) = lookup("FLIP") {
            config.flip = parse_flag(&value);
        }
        if let Some(value) = lookup("DEPTH") {
            config.output = OutputKind::from_depth_flag(parse_flag(&value));
        }
        if let Some(seconds) = number(&lookup, "TIME", parse_positive_f32) {
            config.reveal_seconds = seconds;
        }
        let width = number(&lookup, "WIDTH", parse_positive_u32);
        let height = number(&lookup, "HEIGHT", parse_positive_u32);
        config.canvas_size = CanvasSize::new(
            width.unwrap_or(config.canvas_size.width),
            height.unwrap_or(config.canvas_size.height),
        );
        if let Some(tests) = lookup("TESTS") {
            let variants = parse_variants(&tests);
            if !variants.is_empty() {
                config.variants = variants;
            }
        }
        logwise::info_sync!(
            "resolved configuration {config}",
            config = logwise::privacy::LogIt(&config)
        );
        config
    }

    /// Resolves a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }

    /// # Panics
    /// If `seconds` is not a finite positive number.
    pub fn with_reveal_seconds(mut self, seconds: f32) -> Self {
        assert!(seconds.is_finite() && seconds > 0.0, "reveal time must be positive");
        self.reveal_seconds = seconds;
        self
    }

    pub fn with_canvas_size(mut self, canvas_size: CanvasSize) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    /// Replaces the variant list.  An empty list keeps the default pair.
    pub fn with_variants(mut self, variants: &[TestVariant]) -> Self {
        self.variants = if variants.is_empty() {
            TestVariant::DEFAULT_PAIR.to_vec()
        } else {
            variants.to_vec()
        };
        self
    }

    pub fn live(&self) -> bool {
        self.live
    }
    pub fn flip(&self) -> bool {
        self.flip
    }
    pub fn output(&self) -> OutputKind {
        self.output
    }
    pub fn reveal_seconds(&self) -> f32 {
        self.reveal_seconds
    }
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }
    /// Never empty.
    pub fn variants(&self) -> &[TestVariant] {
        &self.variants
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} {:?} reveal={}s live={} flip={} variants=[",
            self.canvas_size.width,
            self.canvas_size.height,
            self.output,
            self.reveal_seconds,
            self.live,
            self.flip
        )?;
        for (i, variant) in self.variants.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{variant}")?;
        }
        f.write_str("]")
    }
}

/**
Which adapter to run on.

Resolved from the `GPU` key: a number selects by enumeration index, anything else must
match an adapter name exactly.
*/
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    #[default]
    SystemDefault,
    Index(usize),
    Name(String),
}

impl DeviceSelector {
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        match lookup("GPU") {
            None => DeviceSelector::SystemDefault,
            Some(value) => {
                let value = value.trim();
                if value.is_empty() {
                    DeviceSelector::SystemDefault
                } else if let Ok(index) = value.parse::<usize>() {
                    DeviceSelector::Index(index)
                } else {
                    DeviceSelector::Name(value.to_string())
                }
            }
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.chars().next(), Some('1' | 'y' | 'Y'))
}

/// Looks up and parses `key`, warning when a value is present but unusable.
fn number<L, T>(lookup: &L, key: &str, parse: fn(&str) -> Option<T>) -> Option<T>
where
    L: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let parsed = parse(&value);
    if parsed.is_none() {
        logwise::warn_sync!(
            "Ignoring {key}={value}; keeping the default",
            key = logwise::privacy::LogIt(key),
            value = logwise::privacy::LogIt(&value)
        );
    }
    parsed
}

/// Parses the longest prefix of `value` that is a `T`, so `"5s"` reads as 5.
fn leading_number<T: FromStr>(value: &str) -> Option<T> {
    let value = value.trim_start();
    (1..=value.len())
        .rev()
        .filter(|end| value.is_char_boundary(*end))
        .find_map(|end| value[..end].parse().ok())
}

fn parse_positive_f32(value: &str) -> Option<f32> {
    leading_number::<f32>(value).filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_positive_u32(value: &str) -> Option<u32> {
    leading_number::<u32>(value).filter(|v| *v > 0)
}

fn parse_variants(value: &str) -> Vec<TestVariant> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let variant = TestVariant::from_token(token);
            if variant.is_none() {
                logwise::warn_sync!(
                    "Unrecognized test {token}",
                    token = logwise::privacy::LogIt(token)
                );
            }
            variant
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let config = Configuration::from_lookup(|_| None);
        assert_eq!(config, Configuration::default());
        assert!(!config.live());
        assert_eq!(config.reveal_seconds(), 20.0);
        assert_eq!(config.canvas_size(), CanvasSize::new(1920, 1080));
        assert_eq!(config.variants(), &TestVariant::DEFAULT_PAIR);
    }

    #[test]
    fn flags_look_at_first_character() {
        let config = Configuration::from_lookup(lookup(&[
            ("LIVE", "yes"),
            ("FLIP", "1"),
            ("DEPTH", "Yikes"),
        ]));
        assert!(config.live());
        assert!(config.flip());
        assert_eq!(config.output(), OutputKind::Depth);

        let config = Configuration::from_lookup(lookup(&[("LIVE", "true"), ("DEPTH", "0")]));
        assert!(!config.live());
        assert_eq!(config.output(), OutputKind::Color);
    }

    #[test]
    fn numbers_must_be_positive() {
        let config = Configuration::from_lookup(lookup(&[
            ("TIME", "-3"),
            ("WIDTH", "0"),
            ("HEIGHT", "abc"),
        ]));
        assert_eq!(config.reveal_seconds(), 20.0);
        assert_eq!(config.canvas_size(), CanvasSize::new(1920, 1080));

        let config = Configuration::from_lookup(lookup(&[
            ("TIME", "2.5"),
            ("WIDTH", "64"),
            ("HEIGHT", " 32 "),
        ]));
        assert_eq!(config.reveal_seconds(), 2.5);
        assert_eq!(config.canvas_size(), CanvasSize::new(64, 32));
    }

    #[test]
    fn numbers_read_their_leading_digits() {
        let config = Configuration::from_lookup(lookup(&[
            ("TIME", "5s"),
            ("WIDTH", "640px"),
            ("HEIGHT", "px480"),
        ]));
        assert_eq!(config.reveal_seconds(), 5.0);
        assert_eq!(config.canvas_size(), CanvasSize::new(640, 1080));

        let config = Configuration::from_lookup(lookup(&[("TIME", "1.5e1 seconds")]));
        assert_eq!(config.reveal_seconds(), 15.0);
        assert_eq!(leading_number::<u32>("12.5"), Some(12));
        assert_eq!(leading_number::<u32>(""), None);
    }

    #[test]
    fn unknown_tests_are_dropped() {
        let config =
            Configuration::from_lookup(lookup(&[("TESTS", "quad2draws,bogus,0")]));
        assert_eq!(
            config.variants(),
            &[TestVariant::QuadAsTwoDraws, TestVariant::SingleTriangle]
        );
    }

    #[test]
    fn empty_tokens_are_skipped() {
        let config = Configuration::from_lookup(lookup(&[("TESTS", " 1,, 2 ,")]));
        assert_eq!(
            config.variants(),
            &[TestVariant::QuadAsStrip, TestVariant::QuadAsTwoDraws]
        );
        assert!(parse_variants(",, ,").is_empty());
    }

    #[test]
    fn all_unknown_keeps_default_pair() {
        let config = Configuration::from_lookup(lookup(&[("TESTS", "bogus,,nope")]));
        assert_eq!(config.variants(), &TestVariant::DEFAULT_PAIR);
        let config = Configuration::default().with_variants(&[]);
        assert_eq!(config.variants(), &TestVariant::DEFAULT_PAIR);
    }

    #[test]
    fn device_selector() {
        assert_eq!(DeviceSelector::from_lookup(|_| None), DeviceSelector::SystemDefault);
        assert_eq!(
            DeviceSelector::from_lookup(lookup(&[("GPU", "1")])),
            DeviceSelector::Index(1)
        );
        assert_eq!(
            DeviceSelector::from_lookup(lookup(&[("GPU", "AMD Radeon Pro")])),
            DeviceSelector::Name("AMD Radeon Pro".to_string())
        );
    }

    #[test]
    #[should_panic]
    fn zero_canvas_panics() {
        let _ = CanvasSize::new(0, 4);
    }
}
