// File: args.rs
use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogLevel {
    Trace = 0, // Designates very fine-grained informational events, extremely verbose.
    Debug = 1, // Designates fine-grained informational events.
    Info = 2, // Designates informational messages.
    Warn = 3, // Designates hazardous situations.
    Error = 4, // Designates very serious errors.
}

impl LogLevel {
    /// Maps the raw level passed over the C ABI, falling back to `Info`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about="Generates the C# interop class Unity uses to load the camera bridge.")]
pub struct Args {
    #[arg(short, long, default_value = "bindings/csharp/QuestCameraBridge.cs")]
    pub output: String,
    #[arg(short, long, default_value = "QuestCameraBridgeInterop")]
    pub class: String,
    #[arg(short, long, default_value = "Meta.QuestCamera")]
    pub namespace: String,
    #[arg(short, long, default_value = "quest_camera_bridge")]
    pub dll_name: String,
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

pub fn parse_args() -> Args {
    Args::parse()
}
