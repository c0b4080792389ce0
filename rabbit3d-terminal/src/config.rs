/// Command-line configuration for the terminal viewer
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("option {option} expects {expected} value(s)")]
    MissingValue {
        option: &'static str,
        expected: usize,
    },

    #[error("invalid value for {option}: {value}")]
    InvalidValue { option: &'static str, value: String },

    #[error("more than one STL path given: {0}")]
    ExtraPath(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Model to show; a cube is used when absent
    pub stl_path: Option<PathBuf>,
    /// Logical world extent (width, height, depth); `None` fits the model
    pub extent: Option<(f32, f32, f32)>,
    /// Camera speed in world units per second
    pub speed: f32,
    pub fps: u32,
    pub lamp_visible: bool,
    pub spin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stl_path: None,
            extent: None,
            speed: 5.0,
            fps: 30,
            lamp_visible: true,
            spin: true,
        }
    }
}

pub const USAGE: &str = "\
Usage: rabbit3d-terminal [STL_PATH] [OPTIONS]

Options:
  --extent W H D   logical world extent (default: the model's largest side)
  --speed S        camera speed in units per second (default 5)
  --fps N          frame rate target (default 30)
  --lamp           draw the light marker (default)
  --no-lamp        hide the light marker
  --no-spin        keep the model still
  -h, --help       print this message

Controls: W/S forward/back, A/D strafe, Space/C up/down, mouse look, Q/Esc quit";

impl Config {
    /// Parse arguments, excluding the program name
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--extent" => {
                    let width = parse_value("--extent", args.next(), 3)?;
                    let height = parse_value("--extent", args.next(), 3)?;
                    let depth = parse_value("--extent", args.next(), 3)?;
                    config.extent = Some((width, height, depth));
                }
                "--speed" => config.speed = parse_value("--speed", args.next(), 1)?,
                "--fps" => {
                    config.fps = parse_value("--fps", args.next(), 1)?;
                    if config.fps == 0 {
                        return Err(ConfigError::InvalidValue {
                            option: "--fps",
                            value: "0".to_string(),
                        });
                    }
                }
                "--lamp" => config.lamp_visible = true,
                "--no-lamp" => config.lamp_visible = false,
                "--no-spin" => config.spin = false,
                option if option.starts_with('-') => {
                    return Err(ConfigError::UnknownOption(option.to_string()));
                }
                path => {
                    if config.stl_path.is_some() {
                        return Err(ConfigError::ExtraPath(path.to_string()));
                    }
                    config.stl_path = Some(PathBuf::from(path));
                }
            }
        }

        Ok(config)
    }

    /// Whether the arguments ask for the usage text instead of a run
    pub fn wants_help<S: AsRef<str>>(args: &[S]) -> bool {
        args.iter()
            .any(|arg| matches!(arg.as_ref(), "-h" | "--help"))
    }

    pub fn frame_time(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }
}

fn parse_value<T: std::str::FromStr>(
    option: &'static str,
    value: Option<String>,
    expected: usize,
) -> Result<T, ConfigError> {
    let value = value.ok_or(ConfigError::MissingValue { option, expected })?;
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { option, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.extent, None);
        assert!(config.lamp_visible);
    }

    #[test]
    fn test_full_command_line() {
        let config = Config::from_args([
            "models/bunny.stl",
            "--extent",
            "10",
            "20",
            "5",
            "--speed",
            "2.5",
            "--fps",
            "120",
            "--no-lamp",
            "--no-spin",
        ])
        .unwrap();

        assert_eq!(config.stl_path, Some(PathBuf::from("models/bunny.stl")));
        assert_eq!(config.extent, Some((10.0, 20.0, 5.0)));
        assert_eq!(config.speed, 2.5);
        assert_eq!(config.fps, 120);
        assert!(!config.lamp_visible);
        assert!(!config.spin);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Config::from_args(["--bogus"]),
            Err(ConfigError::UnknownOption("--bogus".to_string()))
        );
        assert_eq!(
            Config::from_args(["--extent", "1", "2"]),
            Err(ConfigError::MissingValue {
                option: "--extent",
                expected: 3
            })
        );
        assert_eq!(
            Config::from_args(["--speed", "fast"]),
            Err(ConfigError::InvalidValue {
                option: "--speed",
                value: "fast".to_string()
            })
        );
        assert!(matches!(
            Config::from_args(["--fps", "0"]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(
            Config::from_args(["a.stl", "b.stl"]),
            Err(ConfigError::ExtraPath("b.stl".to_string()))
        );
    }

    #[test]
    fn test_help_and_frame_time() {
        assert!(Config::wants_help(&["x.stl", "--help"]));
        assert!(!Config::wants_help(&["x.stl"]));

        let config = Config {
            fps: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_time(), std::time::Duration::from_millis(20));
    }
}
