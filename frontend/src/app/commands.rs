use anyhow::{anyhow, bail};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// (lon, lat) delta for one step
    pub fn delta(&self, step: f64) -> (f64, f64) {
        match self {
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
            Direction::Up => (0.0, step),
            Direction::Down => (0.0, -step),
        }
    }
}

/// Keys the map window reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    PageUp,
    PageDown,
    Space,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdn" => Some(Key::PageDown),
            "space" => Some(Key::Space),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            _ => None,
        }
    }
}

/// Discrete user actions
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    Pan(Direction),
    CycleLayer,
    /// Geocode the text and jump to the first match
    Search(String),
    /// Mark the clicked pixel and look up its address
    LeftClick { x: u32, y: u32 },
    /// Look for a business matching the last search text at the clicked pixel
    RightClick { x: u32, y: u32 },
    Reset,
    TogglePostalCode,
    Redraw,
    Quit,
}

impl From<Key> for Command {
    fn from(key: Key) -> Self {
        match key {
            Key::PageUp => Command::ZoomIn,
            Key::PageDown => Command::ZoomOut,
            Key::Space => Command::CycleLayer,
            Key::Left => Command::Pan(Direction::Left),
            Key::Right => Command::Pan(Direction::Right),
            Key::Up => Command::Pan(Direction::Up),
            Key::Down => Command::Pan(Direction::Down),
        }
    }
}

fn parse_pixel<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<(u32, u32), anyhow::Error> {
    let x = args.next().ok_or_else(|| anyhow!("missing x"))?.parse()?;
    let y = args.next().ok_or_else(|| anyhow!("missing y"))?.parse()?;
    if args.next().is_some() {
        bail!("expected exactly two pixel values");
    }
    Ok((x, y))
}

/// One line of the command shell
impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        if let Some(key) = Key::from_name(word) {
            if !rest.is_empty() {
                bail!("'{}' takes no arguments", word);
            }
            return Ok(key.into());
        }

        match word.to_ascii_lowercase().as_str() {
            "+" | "zoom-in" => Ok(Command::ZoomIn),
            "-" | "zoom-out" => Ok(Command::ZoomOut),
            "layer" => Ok(Command::CycleLayer),
            "search" => {
                if rest.is_empty() {
                    bail!("search needs some text");
                }
                Ok(Command::Search(rest.to_string()))
            }
            "click" => {
                let (x, y) = parse_pixel(rest.split_whitespace())?;
                Ok(Command::LeftClick { x, y })
            }
            "rclick" => {
                let (x, y) = parse_pixel(rest.split_whitespace())?;
                Ok(Command::RightClick { x, y })
            }
            "reset" => Ok(Command::Reset),
            "postal" => Ok(Command::TogglePostalCode),
            "redraw" => Ok(Command::Redraw),
            "quit" | "exit" => Ok(Command::Quit),
            "" => bail!("empty command"),
            other => bail!("unknown command '{}'", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from(Key::PageUp), Command::ZoomIn);
        assert_eq!(Command::from(Key::PageDown), Command::ZoomOut);
        assert_eq!(Command::from(Key::Space), Command::CycleLayer);
        assert_eq!(Command::from(Key::Left), Command::Pan(Direction::Left));
        assert_eq!(Command::from(Key::Down), Command::Pan(Direction::Down));
    }

    #[test]
    fn test_direction_deltas() {
        assert_eq!(Direction::Right.delta(0.01), (0.01, 0.0));
        assert_eq!(Direction::Left.delta(0.01), (-0.01, 0.0));
        assert_eq!(Direction::Up.delta(0.5), (0.0, 0.5));
        assert_eq!(Direction::Down.delta(0.5), (0.0, -0.5));
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!("PageUp".parse::<Command>().unwrap(), Command::ZoomIn);
        assert_eq!(" space ".parse::<Command>().unwrap(), Command::CycleLayer);
        assert_eq!("-".parse::<Command>().unwrap(), Command::ZoomOut);
        assert_eq!(
            "search  Москва, Тверская 6".parse::<Command>().unwrap(),
            Command::Search("Москва, Тверская 6".to_string())
        );
        assert_eq!(
            "click 300 225".parse::<Command>().unwrap(),
            Command::LeftClick { x: 300, y: 225 }
        );
        assert_eq!(
            "rclick 10 20".parse::<Command>().unwrap(),
            Command::RightClick { x: 10, y: 20 }
        );
        assert_eq!("postal".parse::<Command>().unwrap(), Command::TogglePostalCode);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("fly".parse::<Command>().is_err());
        assert!("search".parse::<Command>().is_err());
        assert!("click 10".parse::<Command>().is_err());
        assert!("click 10 -5".parse::<Command>().is_err());
        assert!("click 1 2 3".parse::<Command>().is_err());
        assert!("left 3".parse::<Command>().is_err());
    }
}
