use std::path::PathBuf;

use clap::Parser;

/// Windowed host that drives the quadpaper renderer.
#[derive(Debug, Parser)]
#[command(name = "quadview", version, about = "Textured quad preview window")]
pub struct Args {
    /// Image file sampled by the quad every frame.
    #[arg(long, default_value = "assets/car_image.png")]
    pub image: PathBuf,

    /// Size the decoded image must measure, as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1280", value_parser = parse_size)]
    pub image_size: (u32, u32),

    /// Window size in physical pixels, as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Abort a frame at the first reported GPU error instead of continuing.
    #[arg(long)]
    pub strict: bool,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let lowered = value.to_ascii_lowercase();
    let (width, height) = lowered
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got '{value}'"));
    }
    Ok((width, height))
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_expected_asset() {
        let args = Args::try_parse_from(["quadview"]).expect("defaults parse");
        assert_eq!(args.image, PathBuf::from("assets/car_image.png"));
        assert_eq!(args.image_size, (1920, 1280));
        assert_eq!(args.size, (1280, 720));
        assert!(!args.strict);
    }

    #[test]
    fn strict_flag_and_sizes_parse() {
        let args = Args::try_parse_from([
            "quadview",
            "--image",
            "/tmp/photo.jpg",
            "--size",
            "640X480",
            "--strict",
        ])
        .expect("flags parse");
        assert_eq!(args.size, (640, 480));
        assert!(args.strict);
    }

    #[test]
    fn malformed_sizes_are_rejected() {
        assert!(Args::try_parse_from(["quadview", "--size", "1280"]).is_err());
        assert!(Args::try_parse_from(["quadview", "--size", "0x720"]).is_err());
        assert!(Args::try_parse_from(["quadview", "--size", "axb"]).is_err());
    }
}
