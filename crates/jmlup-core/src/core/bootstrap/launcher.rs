use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use super::errors::fs_issue;
use super::StageOutcome;
use crate::core::fs::{path_exists, persist_file, set_owner_executable, stage_file};

/// Shell prelude shared by every launcher.
///
/// Collects the positional arguments into `$args`: a token of the form `@path` naming a regular
/// file is replaced by the file's lines, anything else is kept as is. A last line without a
/// trailing newline is still read.
pub const ARGUMENT_PRELUDE: &str = r#"#!/bin/sh -euC

args=
for p in "$@"; do
  case "$p" in
  @*)
    args_file=${p#@}
    if [ -f "$args_file" ]; then
      while IFS= read -r line || [ -n "$line" ]; do
        args="$args $line"
      done < "$args_file"
    else
      args="$args $p"
    fi
    ;;
  *)
    args="$args $p"
    ;;
  esac
done
"#;

/// What a launcher does once `$args` is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardingBody {
    program: String,
}

impl ForwardingBody {
    /// Replace the shell with `program`, passing `$args` unquoted so it splits into words.
    ///
    /// # Errors
    /// Returns an error if `program` is not valid UTF-8 and so cannot be embedded in a script.
    pub fn exec(program: &Path) -> Result<Self> {
        let program = program
            .to_str()
            .ok_or_else(|| anyhow!("launcher target {} is not valid UTF-8", program.display()))?;
        Ok(Self {
            program: program.to_string(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        Path::new(&self.program)
    }

    fn render(&self) -> String {
        format!("exec {} $args\n", shell_quote(&self.program))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherScript {
    prelude: String,
    body: ForwardingBody,
}

impl LauncherScript {
    /// A script with the standard [`ARGUMENT_PRELUDE`].
    #[must_use]
    pub fn new(body: ForwardingBody) -> Self {
        Self::with_prelude(ARGUMENT_PRELUDE, body)
    }

    #[must_use]
    pub fn with_prelude(prelude: impl Into<String>, body: ForwardingBody) -> Self {
        Self {
            prelude: prelude.into(),
            body,
        }
    }

    #[must_use]
    pub fn body(&self) -> &ForwardingBody {
        &self.body
    }

    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\n{}", self.prelude, self.body.render())
    }
}

/// Writes `script` to `target` unless a file is already there.
///
/// # Errors
/// Returns an error if the script cannot be written, made executable, or moved into place.
pub fn generate_launcher(target: &Path, script: &LauncherScript) -> Result<StageOutcome> {
    let name = target
        .file_name()
        .map_or_else(|| target.display().to_string(), |name| name.to_string_lossy().into_owned());
    if path_exists(target) {
        info!(launcher = %name, path = %target.display(), "launcher present; no need to generate");
        return Ok(StageOutcome::Skipped);
    }

    debug!(
        launcher = %name,
        program = %script.body().program().display(),
        "generating launcher"
    );
    let mut staged = stage_file(target)?;
    staged
        .write_all(script.render().as_bytes())
        .map_err(fs_issue("write", staged.path()))?;
    set_owner_executable(staged.path()).map_err(fs_issue("set permissions on", staged.path()))?;
    persist_file(staged, target)?;
    info!(launcher = %name, path = %target.display(), "launcher generated");
    Ok(StageOutcome::Performed)
}

/// Applies the launcher's argument protocol in-process and returns the accumulated string.
///
/// Relative `@path` tokens resolve against `cwd`. The result joins tokens with single spaces,
/// without the leading separator the shell accumulates. Argument files are decoded as UTF-8;
/// invalid bytes become U+FFFD, where the shell launcher would pass them through untouched.
///
/// # Errors
/// Returns an error if an argument file exists but cannot be read.
pub fn expand_arguments<I, S>(args: I, cwd: &Path) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens: Vec<String> = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        let Some(file) = arg.strip_prefix('@') else {
            tokens.push(arg.to_string());
            continue;
        };
        let path = resolve(cwd, file);
        if !path.is_file() {
            tokens.push(arg.to_string());
            continue;
        }
        let bytes = fs::read(&path).map_err(fs_issue("read argument file", &path))?;
        let contents = String::from_utf8_lossy(&bytes);
        tokens.extend(contents.split_terminator('\n').map(str::to_string));
    }
    Ok(tokens.join(" "))
}

/// Splits an accumulated argument string the way the unquoted `$args` expansion does.
#[must_use]
pub fn forwarded_arguments(expanded: &str) -> Vec<String> {
    expanded
        .split([' ', '\t', '\n'])
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve(cwd: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn shell_quote(value: &str) -> String {
    let mut quoted = String::from("'");
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(program: &Path) -> LauncherScript {
        LauncherScript::new(ForwardingBody::exec(program).expect("utf8 program"))
    }

    #[test]
    fn plain_arguments_are_joined() -> Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(expand_arguments(["x", "y"], temp.path())?, "x y");
        assert_eq!(expand_arguments(Vec::<String>::new(), temp.path())?, "");
        Ok(())
    }

    #[test]
    fn missing_argument_file_is_kept_verbatim() -> Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(
            expand_arguments(["@missing.txt"], temp.path())?,
            "@missing.txt"
        );
        fs::create_dir(temp.path().join("dir"))?;
        assert_eq!(expand_arguments(["@dir", "-g"], temp.path())?, "@dir -g");
        Ok(())
    }

    #[test]
    fn argument_file_lines_are_spliced_in() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("response.txt"), "a\nb\n")?;
        fs::write(temp.path().join("unterminated.txt"), "c\nd")?;
        assert_eq!(expand_arguments(["@response.txt"], temp.path())?, "a b");
        assert_eq!(
            expand_arguments(["-cp", "@unterminated.txt", "Main"], temp.path())?,
            "-cp c d Main"
        );
        Ok(())
    }

    #[test]
    fn invalid_utf8_in_argument_file_is_replaced() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("latin1.txt"), b"-Dname=caf\xe9\n-g\n")?;
        assert_eq!(
            expand_arguments(["@latin1.txt"], temp.path())?,
            "-Dname=caf\u{FFFD} -g"
        );
        Ok(())
    }

    #[test]
    fn forwarded_arguments_split_like_the_shell() {
        assert_eq!(
            forwarded_arguments("-cp  lib/a.jar\t-g"),
            vec!["-cp", "lib/a.jar", "-g"]
        );
        assert!(forwarded_arguments("").is_empty());
    }

    #[test]
    fn body_quotes_program_path() -> Result<()> {
        let body = ForwardingBody::exec(Path::new("/opt/it's here/bin/javac.orig"))?;
        assert_eq!(
            body.render(),
            "exec '/opt/it'\\''s here/bin/javac.orig' $args\n"
        );
        Ok(())
    }

    #[test]
    fn second_generation_leaves_script_untouched() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("bin").join("jmlavac");
        let first = script_for(Path::new("/jdk/bin/javac.orig"));

        assert_eq!(generate_launcher(&target, &first)?, StageOutcome::Performed);
        let written = fs::read(&target)?;
        assert_eq!(written, first.render().into_bytes());

        let other = script_for(Path::new("/elsewhere/javac.orig"));
        assert_eq!(generate_launcher(&target, &other)?, StageOutcome::Skipped);
        assert_eq!(fs::read(&target)?, written);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn launcher_expands_argument_files_when_run() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        use std::process::Command;

        let temp = tempfile::tempdir()?;
        let program = temp.path().join("javac.orig");
        fs::write(
            &program,
            "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\"; done\n",
        )?;
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755))?;
        let launcher = temp.path().join("jmlavac");
        generate_launcher(&launcher, &script_for(&program))?;
        assert_ne!(fs::metadata(&launcher)?.permissions().mode() & 0o100, 0);
        fs::write(temp.path().join("args.txt"), "-version\n-g")?;

        let output = Command::new(&launcher)
            .args(["@args.txt", "plain", "@missing.txt"])
            .current_dir(temp.path())
            .output()?;

        assert!(output.status.success(), "launcher failed: {output:?}");
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "-version\n-g\nplain\n@missing.txt\n"
        );
        Ok(())
    }
}
