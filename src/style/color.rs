//! CSS color parsing for hosts that rasterize plans themselves.
//!
//! Browser hosts hand color strings to the canvas verbatim. The CPU backend needs actual
//! channel values, so it goes through [`parse_css_color`], which understands the forms overlay
//! templates use in practice.

/// Straight-alpha color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Rgba {
    pub(crate) fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Quantize to straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

/// Parse a CSS color string.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`, `hsl()`/`hsla()` (comma or
/// space separated, optional `/ alpha`, percentages) and a handful of keywords. Returns `None`
/// for anything else.
pub fn parse_css_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok();
    }

    let lower = s.to_ascii_lowercase();
    if let Some((name, args)) = lower.split_once('(') {
        let args = args.strip_suffix(')')?;
        return match name.trim() {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            _ => None,
        };
    }

    named_color(&lower)
}

fn parse_hex(s: &str) -> Result<Rgba, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(Rgba::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

/// Split functional-notation arguments into channel tokens plus an optional alpha token.
fn split_args(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let (channels, slash_alpha) = match args.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (args, None),
    };

    let mut parts: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    match (parts.len(), slash_alpha) {
        (3, alpha) => Some((parts, alpha)),
        (4, None) => {
            let alpha = parts.pop();
            Some((parts, alpha))
        }
        _ => None,
    }
}

fn parse_alpha(token: Option<&str>) -> Option<f64> {
    match token {
        None => Some(1.0),
        Some(t) => match t.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
            None => t.parse::<f64>().ok(),
        },
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    fn channel(t: &str) -> Option<f64> {
        match t.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
            None => t.parse::<f64>().ok().map(|v| v / 255.0),
        }
    }

    let (parts, alpha) = split_args(args)?;
    Some(Rgba::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        parse_alpha(alpha)?,
    ))
}

fn parse_hsl_args(args: &str) -> Option<Rgba> {
    fn percent(t: &str) -> Option<f64> {
        t.strip_suffix('%')
            .unwrap_or(t)
            .trim()
            .parse::<f64>()
            .ok()
            .map(|v| v / 100.0)
    }

    let (parts, alpha) = split_args(args)?;
    let h = parts[0].strip_suffix("deg").unwrap_or(parts[0]);
    let h = h.parse::<f64>().ok()?;
    Some(hsla_to_rgba(
        h,
        percent(parts[1])?,
        percent(parts[2])?,
        parse_alpha(alpha)?,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Rgba {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgba::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgba::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

fn named_color(name: &str) -> Option<Rgba> {
    let [r, g, b, a]: [u8; 4] = match name {
        "transparent" => [0, 0, 0, 0],
        "black" => [0, 0, 0, 255],
        "white" => [255, 255, 255, 255],
        "red" => [255, 0, 0, 255],
        "green" => [0, 128, 0, 255],
        "blue" => [0, 0, 255, 255],
        "yellow" => [255, 255, 0, 255],
        "orange" => [255, 165, 0, 255],
        "gold" => [255, 215, 0, 255],
        "gray" | "grey" => [128, 128, 128, 255],
        _ => return None,
    };
    Some(Rgba::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
