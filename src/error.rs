//! Error types for neondrift.
//!
//! Generation parameters are validated once at startup; GPU setup is the only
//! other place anything can fail. Per-frame updates are purely numeric and
//! have no error path.

use std::fmt;

/// Errors from validating a [`SceneConfig`](crate::config::SceneConfig).
///
/// All variants are caught before any geometry is generated, so a scene that
/// builds at all is built from sane parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count parameter was zero where at least one element is required.
    ZeroCount(&'static str),
    /// A numeric range was empty or inverted (min >= max).
    EmptyRange(&'static str),
    /// A probability parameter fell outside [0, 1].
    BadProbability(&'static str, f32),
    /// A length/extent parameter was not strictly positive.
    NonPositive(&'static str, f32),
    /// The accent palette has no colors to pick from.
    EmptyPalette,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCount(name) => write!(f, "{} must be at least 1", name),
            ConfigError::EmptyRange(name) => write!(f, "range {} is empty (min >= max)", name),
            ConfigError::BadProbability(name, v) => {
                write!(f, "{} must be within [0, 1], got {}", name, v)
            }
            ConfigError::NonPositive(name, v) => {
                write!(f, "{} must be positive, got {}", name, v)
            }
            ConfigError::EmptyPalette => write!(f, "palette must contain at least one color"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found, even on the GL fallback path.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found on the primary backends or the GL fallback."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Scene configuration was rejected at startup.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
