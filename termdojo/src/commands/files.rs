//! Filesystem commands: navigation, inspection and file manipulation.

use crate::commands::{Shell, apply_all, operands};
use crate::core::error::CommandError;
use crate::core::filesystem::Filesystem;
use crate::core::types::Metadata;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub(super) fn pwd(shell: &mut Shell<'_>, _args: &[&str]) -> Result<String, CommandError> {
    Ok(shell.fs.pwd().to_string())
}

pub(super) fn ls(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let mut show_hidden = false;
    let mut long = false;
    let mut path = "";
    for &arg in args {
        match arg.strip_prefix('-') {
            Some(flags) => {
                show_hidden |= flags.contains('a');
                long |= flags.contains('l');
            }
            None => path = arg,
        }
    }
    if !long {
        return Ok(shell.fs.ls(path, show_hidden)?.join("  "));
    }
    let entries = shell.fs.entries(path, show_hidden)?;
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| long_line(entry, shell.fs.user()))
        .collect();
    Ok(lines.join("\n"))
}

fn long_line(entry: &Metadata, owner: &str) -> String {
    let (mode, size, name) = if entry.is_dir() {
        ("drwxr-xr-x", "-".to_string(), format!("{}/", entry.name))
    } else {
        (
            "-rw-r--r--",
            entry.size.unwrap_or_default().to_string(),
            entry.name.clone(),
        )
    };
    format!(
        "{mode} {owner} {size:>6} {} {name}",
        entry.modified.format("%b %e %H:%M")
    )
}

pub(super) fn cd(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    shell.fs.cd(args.first().copied().unwrap_or(""))?;
    Ok(String::new())
}

pub(super) fn mkdir(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let paths = operands(args);
    if paths.is_empty() {
        return Err(CommandError::missing("mkdir", "missing operand"));
    }
    apply_all(shell.fs, &paths, Filesystem::mkdir)?;
    Ok(String::new())
}

pub(super) fn touch(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::missing("touch", "missing file operand"));
    }
    apply_all(shell.fs, args, Filesystem::touch)?;
    Ok(String::new())
}

pub(super) fn cat(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::missing("cat", "missing file operand"));
    }
    let contents = args
        .iter()
        .map(|path| shell.fs.read_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contents.join("\n"))
}

pub(super) fn cp(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let (src, dst) = source_and_destination("cp", args)?;
    shell.fs.cp(src, dst)?;
    Ok(String::new())
}

pub(super) fn mv(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let (src, dst) = source_and_destination("mv", args)?;
    shell.fs.mv(src, dst)?;
    Ok(String::new())
}

/// The last two words are source and destination; earlier words are ignored.
fn source_and_destination<'a>(
    command: &'static str,
    args: &[&'a str],
) -> Result<(&'a str, &'a str), CommandError> {
    match args {
        [.., src, dst] => Ok((*src, *dst)),
        _ => Err(CommandError::missing(command, "missing destination file operand")),
    }
}

pub(super) fn rm(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let paths = operands(args);
    if paths.is_empty() {
        return Err(CommandError::missing("rm", "missing operand"));
    }
    apply_all(shell.fs, &paths, Filesystem::rm)?;
    Ok(String::new())
}

/// `echo words...`, optionally redirected with `> file`, `>> file`, `>file` or `>>file`.
pub(super) fn echo(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let mut words = Vec::new();
    let mut redirect: Option<(&str, bool)> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (target, append) = match *arg {
            ">" | ">>" => {
                let target = iter
                    .next()
                    .ok_or_else(|| CommandError::missing("echo", "missing redirect target"))?;
                (*target, *arg == ">>")
            }
            other => match other.strip_prefix(">>") {
                Some(target) => (target, true),
                None => match other.strip_prefix('>') {
                    Some(target) => (target, false),
                    None => {
                        words.push(other);
                        continue;
                    }
                },
            },
        };
        redirect = Some((target, append));
    }

    let text = words.join(" ");
    let Some((target, append)) = redirect else {
        return Ok(text);
    };
    let line = format!("{text}\n");
    if append {
        shell.fs.append_file(target, &line)?;
    } else {
        shell.fs.write_file(target, &line)?;
    }
    Ok(String::new())
}

pub(super) fn grep(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let [pattern, file, ..] = args else {
        return Err(CommandError::missing("grep", "missing pattern or file"));
    };
    Ok(shell.fs.grep(pattern, file)?.join("\n"))
}

/// `find [start] -name pattern`; the start defaults to `.` and quotes around
/// the pattern are stripped.
pub(super) fn find(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::missing("find", "missing arguments"));
    }
    let start = match args.first() {
        Some(first) if !first.starts_with('-') => *first,
        _ => ".",
    };
    let pattern = args
        .windows(2)
        .find(|pair| pair[0] == "-name")
        .map(|pair| pair[1].trim_matches(|c| c == '"' || c == '\''))
        .ok_or_else(|| CommandError::missing("find", "missing -name pattern"))?;
    Ok(shell.fs.find(start, pattern)?.join("\n"))
}

pub(super) fn clear(_shell: &mut Shell<'_>, _args: &[&str]) -> Result<String, CommandError> {
    Ok(CLEAR_SCREEN.to_string())
}

#[cfg(test)]
mod tests {
    use crate::commands::{Shell, dispatch, tokenize};
    use crate::core::error::{CommandError, FsError};
    use crate::core::filesystem::{DEFAULT_HOME, DEFAULT_USER, Filesystem};
    use crate::core::session::SessionState;

    fn sandbox() -> Filesystem {
        Filesystem::bootstrap(DEFAULT_HOME, DEFAULT_USER).expect("bootstrap")
    }

    fn run(fs: &mut Filesystem, line: &str) -> Result<String, CommandError> {
        let mut session = SessionState::new();
        let mut shell = Shell {
            fs,
            session: &mut session,
        };
        dispatch(&mut shell, &tokenize(line))
    }

    #[test]
    fn pwd_and_cd() {
        let mut fs = sandbox();
        assert_eq!(run(&mut fs, "pwd").expect("pwd"), "/home/learner");
        run(&mut fs, "cd /var/log").expect("cd");
        assert_eq!(run(&mut fs, "pwd").expect("pwd"), "/var/log");
        run(&mut fs, "cd").expect("cd home");
        assert_eq!(fs.pwd(), "/home/learner");
    }

    #[test]
    fn ls_flags() {
        let mut fs = sandbox();
        assert_eq!(
            run(&mut fs, "ls").expect("ls"),
            "documents/  downloads/  projects/  readme.txt"
        );
        let all = run(&mut fs, "ls -la").expect("ls -la");
        assert!(all.contains(".bashrc"));
        assert!(
            all.lines()
                .any(|l| l.starts_with("drwxr-xr-x learner") && l.ends_with("projects/"))
        );
        assert!(
            all.lines()
                .any(|l| l.starts_with("-rw-r--r--") && l.ends_with("readme.txt"))
        );
        assert_eq!(run(&mut fs, "ls -a /etc").expect("ls /etc"), "passwd");
    }

    #[test]
    fn mkdir_skips_flags_and_requires_operand() {
        let mut fs = sandbox();
        run(&mut fs, "mkdir -p a/b c").expect("mkdir");
        assert!(fs.is_dir("a/b"));
        assert!(fs.is_dir("c"));
        assert_eq!(
            run(&mut fs, "mkdir -p").unwrap_err().to_string(),
            "mkdir: missing operand"
        );
    }

    #[test]
    fn multi_operand_failure_changes_nothing() {
        let mut fs = sandbox();
        let err = run(&mut fs, "touch fresh.txt readme.txt/inner").unwrap_err();
        assert_eq!(
            err,
            CommandError::Fs(FsError::NotADirectory(
                "/home/learner/readme.txt".to_string()
            ))
        );
        assert!(!fs.exists("fresh.txt"));

        fs.touch("x").expect("touch");
        assert!(run(&mut fs, "rm x missing").is_err());
        assert!(fs.exists("x"));
    }

    #[test]
    fn cat_joins_files() {
        let mut fs = sandbox();
        fs.write_file("/a", "one").expect("write");
        fs.write_file("/b", "two").expect("write");
        assert_eq!(run(&mut fs, "cat /a /b").expect("cat"), "one\ntwo");
        assert_eq!(
            run(&mut fs, "cat /nope").unwrap_err().to_string(),
            "no such file or directory: /nope"
        );
        assert_eq!(
            run(&mut fs, "cat").unwrap_err().to_string(),
            "cat: missing file operand"
        );
    }

    #[test]
    fn cp_and_mv_use_last_two_words() {
        let mut fs = sandbox();
        run(&mut fs, "cp -v readme.txt documents").expect("cp");
        assert!(fs.exists("documents/readme.txt"));
        run(&mut fs, "mv documents/readme.txt notes.txt").expect("mv");
        assert!(fs.exists("notes.txt"));
        assert!(!fs.exists("documents/readme.txt"));
        assert_eq!(
            run(&mut fs, "mv only").unwrap_err().to_string(),
            "mv: missing destination file operand"
        );
    }

    #[test]
    fn rm_directory_fails_and_keeps_it() {
        let mut fs = sandbox();
        let err = run(&mut fs, "rm -r projects").unwrap_err();
        assert_eq!(err, CommandError::Fs(FsError::IsADirectory("projects".to_string())));
        assert!(fs.is_dir("projects"));
    }

    #[test]
    fn echo_prints_or_redirects() {
        let mut fs = sandbox();
        assert_eq!(run(&mut fs, "echo hello   world").expect("echo"), "hello world");
        assert_eq!(run(&mut fs, "echo test > file.txt").expect("echo >"), "");
        assert_eq!(fs.read_file("file.txt").expect("read"), "test\n");
        run(&mut fs, "echo more >> file.txt").expect("echo >>");
        run(&mut fs, "echo last >>file.txt").expect("echo >>attached");
        assert_eq!(fs.read_file("file.txt").expect("read"), "test\nmore\nlast\n");
        run(&mut fs, "echo fresh >file.txt").expect("echo >attached");
        assert_eq!(fs.read_file("file.txt").expect("read"), "fresh\n");
        assert_eq!(
            run(&mut fs, "echo oops >").unwrap_err().to_string(),
            "echo: missing redirect target"
        );
    }

    #[test]
    fn echo_keeps_quotes_and_pipes_literal() {
        let mut fs = sandbox();
        assert_eq!(run(&mut fs, "echo \"hi\" | wc").expect("echo"), "\"hi\" | wc");
    }

    #[test]
    fn grep_and_find() {
        let mut fs = sandbox();
        fs.write_file("/var/log/app.log", "ok\nERROR disk\nok\n").expect("write");
        assert_eq!(run(&mut fs, "grep ERROR /var/log/app.log").expect("grep"), "ERROR disk");
        assert!(run(&mut fs, "grep ERROR").is_err());

        assert_eq!(
            run(&mut fs, "find /var -name \"*.log\"").expect("find"),
            "/var/log/app.log"
        );
        run(&mut fs, "cd /var").expect("cd");
        assert_eq!(run(&mut fs, "find -name app.log").expect("find"), "/var/log/app.log");
        assert_eq!(
            run(&mut fs, "find /var").unwrap_err().to_string(),
            "find: missing -name pattern"
        );
        assert!(matches!(
            run(&mut fs, "find / -name [x"),
            Err(CommandError::Fs(FsError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn clear_emits_ansi_reset() {
        let mut fs = sandbox();
        assert_eq!(run(&mut fs, "clear").expect("clear"), "\x1b[2J\x1b[H");
    }
}
