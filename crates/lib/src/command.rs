//! Recipe line lexing and command parsing.
//!
//! A recipe line is `command [argument-text]`. A `#` anywhere starts a comment
//! that runs to the end of the line. The argument text stays undivided until a
//! command needs to split it, and the last piece a command takes keeps any
//! inner whitespace (important for `exec` and `echo`).

use crate::platform::Os;
use crate::transport::FetchMode;

/// Remove a trailing comment and trailing whitespace.
pub fn strip_comment(line: &str) -> &str {
  line.split('#').next().unwrap_or_default().trim_end()
}

/// Split off the first whitespace-delimited token.
///
/// The remainder has its leading whitespace removed and is `None` when empty.
pub fn split_in_2(text: &str) -> (&str, Option<&str>) {
  let text = text.trim_start();
  match text.find(char::is_whitespace) {
    Some(pos) => {
      let rest = text[pos..].trim_start();
      (&text[..pos], (!rest.is_empty()).then_some(rest))
    }
    None => (text, None),
  }
}

/// Local file operation that takes a source and a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
  Cp,
  Mv,
}

/// Local file operation that takes a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
  Mkdir,
  Rmdir,
  Rm,
  Touch,
}

/// The boolean tested by a conditional modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
  /// `on $name` - variable bound to a truthy value
  VarSet(&'a str),
  /// `ondir path`
  DirExists(&'a str),
  /// `onfile path`
  FileExists(&'a str),
  /// `onlastchanged` - the previous fetch in this run changed its destination
  LastChanged,
  /// `onchanged` - any fetch in this run changed its destination
  RunChanged,
  /// `onanychanged` - any fetch in this invocation changed its destination
  AnyChanged,
  /// `onalerts` - alerts have been recorded
  Alerts,
  /// `windows`, `linux`, `osx`
  Os(Os),
}

/// A parsed recipe line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
  SetVar { name: &'a str, value: &'a str },
  Include(&'a str),
  Sinclude(&'a str),
  Hosting(&'a str),
  UriTemplate(&'a str),
  Versions(Option<&'a str>),
  Authority(&'a str),
  Uses(&'a str),
  DefaultVar { name: &'a str, value: &'a str },
  ShowVars,
  LcVars,
  AutoVars,
  Dest(Option<&'a str>),
  Get { src: &'a str, dst: Option<&'a str>, mode: FetchMode },
  Transfer { op: TransferOp, src: &'a str, dst: &'a str },
  Path { op: PathOp, path: &'a str },
  Exec(&'a str),
  Subst { src: &'a str, dst: Option<&'a str> },
  Conditional { predicate: Predicate<'a>, instruction: &'a str },
  Not(&'a str),
  Echo(Option<&'a str>),
  Pause(Option<&'a str>),
  Alert(&'a str),
  ShowAlerts,
  AlertsToFile(&'a str),
  Stop(Option<&'a str>),
}

impl<'a> Command<'a> {
  /// Parse a comment-stripped, non-blank line.
  ///
  /// Handlers are tried in a fixed order and the first whose keyword and
  /// argument shape match wins. `None` means no handler accepts the line,
  /// including keywords given too few arguments.
  pub fn parse(line: &'a str) -> Option<Self> {
    let (command, args) = split_in_2(line);

    if let Some(name) = command.strip_prefix('$') {
      return Some(Command::SetVar {
        name,
        value: args.unwrap_or_default(),
      });
    }

    let parsed = match (command, args) {
      ("include", Some(path)) => Command::Include(path),
      ("sinclude", Some(text)) => Command::Sinclude(text),
      ("hosting", Some(host)) => Command::Hosting(host),
      ("uritemplate", Some(template)) => Command::UriTemplate(template),
      ("versions", file) => Command::Versions(file),
      ("authority", Some(src)) => Command::Authority(src),
      ("uses", Some(name)) => Command::Uses(name),
      ("default", Some(args)) if args.starts_with('$') => {
        let (var, value) = split_in_2(args);
        Command::DefaultVar {
          name: &var[1..],
          value: value.unwrap_or_default(),
        }
      }
      ("showvars", _) => Command::ShowVars,
      ("lcvars", _) => Command::LcVars,
      ("autovars", _) => Command::AutoVars,
      ("dest", dest) => Command::Dest(dest),
      ("get" | "copy", Some(args)) => Self::get(args, FetchMode::Text),
      ("bget" | "bcopy", Some(args)) => Self::get(args, FetchMode::Binary),
      ("cp" | "mv", Some(args)) => {
        let (src, dst) = split_in_2(args);
        let op = if command == "cp" { TransferOp::Cp } else { TransferOp::Mv };
        Command::Transfer { op, src, dst: dst? }
      }
      ("mkdir", Some(path)) => Command::Path { op: PathOp::Mkdir, path },
      ("rmdir", Some(path)) => Command::Path { op: PathOp::Rmdir, path },
      ("rm", Some(path)) => Command::Path { op: PathOp::Rm, path },
      ("touch", Some(path)) => Command::Path { op: PathOp::Touch, path },
      ("exec", Some(cmd)) => Command::Exec(cmd),
      ("subst", Some(args)) => {
        let (src, dst) = split_in_2(args);
        Command::Subst { src, dst }
      }
      ("on", Some(args)) if args.starts_with('$') => {
        let (var, instruction) = split_in_2(args);
        Self::conditional(Predicate::VarSet(&var[1..]), instruction?)
      }
      ("ondir", Some(args)) => {
        let (path, instruction) = split_in_2(args);
        Self::conditional(Predicate::DirExists(path), instruction?)
      }
      ("onfile", Some(args)) => {
        let (path, instruction) = split_in_2(args);
        Self::conditional(Predicate::FileExists(path), instruction?)
      }
      ("onlastchanged", Some(instruction)) => Self::conditional(Predicate::LastChanged, instruction),
      ("onchanged", Some(instruction)) => Self::conditional(Predicate::RunChanged, instruction),
      ("onanychanged", Some(instruction)) => Self::conditional(Predicate::AnyChanged, instruction),
      ("onalerts", Some(instruction)) => Self::conditional(Predicate::Alerts, instruction),
      ("windows" | "linux" | "osx", Some(instruction)) => {
        Self::conditional(Predicate::Os(Os::from_keyword(command)?), instruction)
      }
      ("not", Some(instruction)) => Command::Not(instruction),
      ("echo", message) => Command::Echo(message),
      ("pause", message) => Command::Pause(message),
      ("alert", Some(message)) => Command::Alert(message),
      ("showalerts", _) => Command::ShowAlerts,
      ("alertstofile", Some(path)) => Command::AlertsToFile(path),
      ("stop", message) => Command::Stop(message),
      _ => return None,
    };

    Some(parsed)
  }

  fn get(args: &'a str, mode: FetchMode) -> Self {
    let (src, dst) = split_in_2(args);
    Command::Get { src, dst, mode }
  }

  fn conditional(predicate: Predicate<'a>, instruction: &'a str) -> Self {
    Command::Conditional { predicate, instruction }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn comments_and_trailing_space_removed() {
    assert_eq!(strip_comment("get a.txt   # fetch it"), "get a.txt");
    assert_eq!(strip_comment("# whole line"), "");
    assert_eq!(strip_comment("echo x  "), "echo x");
  }

  #[test]
  fn split_keeps_inner_whitespace() {
    assert_eq!(split_in_2("exec  make   all  -j4"), ("exec", Some("make   all  -j4")));
    assert_eq!(split_in_2("  showvars"), ("showvars", None));
    assert_eq!(split_in_2("dest   "), ("dest", None));
    assert_eq!(split_in_2(""), ("", None));
  }

  #[test]
  fn variable_assignment() {
    assert_eq!(
      Command::parse("$project Zing Thing"),
      Some(Command::SetVar {
        name: "project",
        value: "Zing Thing"
      })
    );
    assert_eq!(Command::parse("$ext_home"), Some(Command::SetVar { name: "ext_home", value: "" }));
  }

  #[test]
  fn default_requires_sigil() {
    assert_eq!(
      Command::parse("default $plant tulip"),
      Some(Command::DefaultVar {
        name: "plant",
        value: "tulip"
      })
    );
    assert_eq!(Command::parse("default plant tulip"), None);
    assert_eq!(Command::parse("default"), None);
  }

  #[test]
  fn fetch_forms() {
    assert_eq!(
      Command::parse("copy a.txt b/"),
      Some(Command::Get {
        src: "a.txt",
        dst: Some("b/"),
        mode: FetchMode::Text
      })
    );
    assert_eq!(
      Command::parse("bget logo.png"),
      Some(Command::Get {
        src: "logo.png",
        dst: None,
        mode: FetchMode::Binary
      })
    );
    assert_eq!(Command::parse("get"), None);
  }

  #[test]
  fn transfer_needs_destination() {
    assert_eq!(
      Command::parse("mv a b"),
      Some(Command::Transfer {
        op: TransferOp::Mv,
        src: "a",
        dst: "b"
      })
    );
    assert_eq!(Command::parse("cp a"), None);
  }

  #[test]
  fn conditionals_need_an_instruction() {
    assert_eq!(
      Command::parse("on $debug echo hi there"),
      Some(Command::Conditional {
        predicate: Predicate::VarSet("debug"),
        instruction: "echo hi there"
      })
    );
    assert_eq!(Command::parse("on $debug"), None);
    assert_eq!(Command::parse("on debug echo x"), None);
    assert_eq!(Command::parse("ondir build"), None);
    assert_eq!(Command::parse("onchanged"), None);
  }

  #[test]
  fn os_modifiers() {
    assert_eq!(
      Command::parse("osx echo mac"),
      Some(Command::Conditional {
        predicate: Predicate::Os(Os::MacOs),
        instruction: "echo mac"
      })
    );
    assert!(matches!(
      Command::parse("windows exec dir"),
      Some(Command::Conditional {
        predicate: Predicate::Os(Os::Windows),
        ..
      })
    ));
  }

  #[test]
  fn optional_arguments() {
    assert_eq!(Command::parse("versions"), Some(Command::Versions(None)));
    assert_eq!(Command::parse("dest"), Some(Command::Dest(None)));
    assert_eq!(Command::parse("echo"), Some(Command::Echo(None)));
    assert_eq!(Command::parse("stop  now please"), Some(Command::Stop(Some("now please"))));
  }

  #[test]
  fn unknown_keyword() {
    assert_eq!(Command::parse("fetch a.txt"), None);
    assert_eq!(Command::parse("include"), None);
  }
}
