use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownValueError;

/// Target platforms a module can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Win32,
  Win64,
  Linux,
  Mac,
  Android,
  Nx,
  Dreamcast,
  RaspberryPi,
}

/// Hardware class of a platform, used for the `<P>_PLATFORM_<CLASS>` define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformClass {
  Desktop,
  Console,
  Mobile,
  Embedded,
}

impl PlatformClass {
  pub fn as_define(&self) -> &'static str {
    match self {
      Self::Desktop => "DESKTOP",
      Self::Console => "CONSOLE",
      Self::Mobile => "MOBILE",
      Self::Embedded => "EMBEDDED",
    }
  }
}

impl Platform {
  /// Every platform, in declaration order.
  pub const ALL: [Platform; 8] = [
    Self::Win32,
    Self::Win64,
    Self::Linux,
    Self::Mac,
    Self::Android,
    Self::Nx,
    Self::Dreamcast,
    Self::RaspberryPi,
  ];

  /// Returns the lowercase string identifier used in build scripts
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Win32 => "win32",
      Self::Win64 => "win64",
      Self::Linux => "linux",
      Self::Mac => "mac",
      Self::Android => "android",
      Self::Nx => "nx",
      Self::Dreamcast => "dreamcast",
      Self::RaspberryPi => "raspberrypi",
    }
  }

  /// File suffix and folder tokens that mark platform-specific sources.
  ///
  /// `Renderer_windows.cpp` and `renderer/win32/Window.cpp` both belong to the
  /// Windows platforms, so both tokens are listed for win32 and win64.
  pub fn tokens(&self) -> &'static [&'static str] {
    match self {
      Self::Win32 | Self::Win64 => &["windows", "win32"],
      Self::Linux => &["linux"],
      Self::Mac => &["macosx"],
      Self::Android => &["android"],
      Self::Nx => &["nx", "switch"],
      Self::Dreamcast => &["dreamcast"],
      Self::RaspberryPi => &["raspberrypi"],
    }
  }

  /// Name of the platform family define (`<P>_PLATFORM_<FAMILY>`).
  pub fn family_define(&self) -> &'static str {
    match self {
      Self::Win32 | Self::Win64 => "WINDOWS",
      Self::Linux => "LINUX",
      Self::Mac => "MACOSX",
      Self::Android => "ANDROID",
      Self::Nx => "SWITCH",
      Self::Dreamcast => "DREAMCAST",
      Self::RaspberryPi => "RASPBERRYPI",
    }
  }

  pub fn class(&self) -> PlatformClass {
    match self {
      Self::Win32 | Self::Win64 | Self::Linux | Self::Mac => PlatformClass::Desktop,
      Self::Nx | Self::Dreamcast => PlatformClass::Console,
      Self::Android => PlatformClass::Mobile,
      Self::RaspberryPi => PlatformClass::Embedded,
    }
  }

  pub fn is_64bit(&self) -> bool {
    matches!(self, Self::Win64 | Self::Linux | Self::Mac | Self::Android | Self::Nx)
  }

  /// Preprocessor defines describing this platform, in a fixed order:
  /// family, class, word size, endianness.
  pub fn defines(&self, prefix: &str) -> Vec<String> {
    let bits = if self.is_64bit() { "64BIT" } else { "32BIT" };
    vec![
      format!("{}_PLATFORM_{}", prefix, self.family_define()),
      format!("{}_PLATFORM_{}", prefix, self.class().as_define()),
      format!("{}_PLATFORM_{}", prefix, bits),
      // Every supported platform is little-endian.
      format!("{}_ENDIAN_LITTLE", prefix),
    ]
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Platform {
  type Err = UnknownValueError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|p| p.as_str() == lower)
      .ok_or_else(|| UnknownValueError::new("platform", s))
  }
}
