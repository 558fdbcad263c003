//! ASCII welcome banner with a navy-to-gold gradient.

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;
use figlet_rs::FIGfont;
use std::io::{stdout, Write};

/// Deep navy (#1f3a5f).
const NAVY: (u8, u8, u8) = (0x1f, 0x3a, 0x5f);
/// Brass gold (#d4af37).
const GOLD: (u8, u8, u8) = (0xd4, 0xaf, 0x37);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "INTAKE" in FIGlet with a navy-to-gold
/// gradient, then version and tagline. Purely decorative; any terminal
/// hiccup is ignored.
pub fn print_welcome() {
    let Ok(font) = FIGfont::standard() else {
        return;
    };
    let Some(figure) = font.convert("INTAKE") else {
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    let mut out = stdout();
    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(NAVY, GOLD, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: GOLD.0,
        g: GOLD.1,
        b: GOLD.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Legal help in four steps\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_match_the_palette() {
        assert_eq!(lerp_rgb(NAVY, GOLD, 0.0), NAVY);
        assert_eq!(lerp_rgb(NAVY, GOLD, 1.0), GOLD);
    }
}
