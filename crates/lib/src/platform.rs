//! Host platform detection for the `windows`, `linux` and `osx` modifiers.

use std::fmt;

/// Operating systems a recipe can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// The OS this binary runs on, if it is one recipes can name.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  pub fn from_keyword(keyword: &str) -> Option<Self> {
    match keyword {
      "windows" => Some(Self::Windows),
      "linux" => Some(Self::Linux),
      "osx" => Some(Self::MacOs),
      _ => None,
    }
  }

  /// The recipe modifier that tests for this OS.
  pub fn keyword(self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "osx",
      Self::Windows => "windows",
    }
  }

  pub fn is_current(self) -> bool {
    Self::current() == Some(self)
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.keyword())
  }
}

/// `<arch>-<os>` for the running host, e.g. `x86_64-linux`.
pub fn host_triple() -> String {
  format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}
