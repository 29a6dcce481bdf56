//! Task file reading and writing.
//!
//! Tasks are stored one per line as `<text>|<completed>|<daily>|<priority>`,
//! where the flags are `0` or `1` and the priority is `-1` (Daily), `0` (Low),
//! `1` (Mid) or `2` (High). The delimiter is not escaped. Lines are split from
//! the right, so the text itself may contain `|`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::StorageError;
use crate::fields::{LoadMode, Priority};
use crate::task::{Task, TaskId};

pub const DELIMITER: char = '|';

/// Result of reading a task file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    /// Lines that could not be parsed.
    pub rejected: usize,
    /// 1-based line where reading stopped, under `LoadMode::StopAtFirstError`.
    pub stopped_at: Option<usize>,
}

impl Loaded {
    /// True when some of the file was not read back.
    pub fn is_partial(&self) -> bool {
        self.rejected > 0 || self.stopped_at.is_some()
    }
}

/// Format one task as a line, without the trailing newline.
pub fn encode_line(task: &Task) -> String {
    format!(
        "{text}{d}{completed}{d}{daily}{d}{priority}",
        text = task.text,
        completed = u8::from(task.completed),
        daily = u8::from(task.is_daily),
        priority = task.priority.code(),
        d = DELIMITER,
    )
}

/// Parse one line of the task file. `line_no` is only used for error reports.
///
/// The returned task carries a placeholder id; callers number tasks themselves.
pub fn decode_line(line: &str, line_no: usize) -> Result<Task, StorageError> {
    let malformed = |reason: String| StorageError::Malformed {
        line: line_no,
        reason,
    };
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = line.rsplitn(4, DELIMITER);
    let (Some(priority), Some(daily), Some(completed), Some(text)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected 4 fields".to_string()));
    };

    if text.trim().is_empty() {
        return Err(malformed("empty task text".to_string()));
    }
    let completed = parse_flag(completed).ok_or_else(|| malformed(format!("bad completed flag {completed:?}")))?;
    let is_daily = parse_flag(daily).ok_or_else(|| malformed(format!("bad daily flag {daily:?}")))?;
    let priority = Priority::from_code(priority).ok_or_else(|| malformed(format!("bad priority {priority:?}")))?;

    if is_daily != priority.is_daily() {
        warn!("line {line_no}: daily flag disagrees with priority {priority}, using the priority");
    }
    let mut task = Task::new(TaskId(0), text, priority.is_daily());
    task.completed = completed;
    task.set_priority(priority);
    Ok(task)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// Render a whole task list in file format.
pub fn render(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&encode_line(task));
        out.push('\n');
    }
    out
}

/// Parse file contents. Accepted tasks are numbered 1..n in file order.
pub fn parse(content: &str, mode: LoadMode) -> Loaded {
    let mut loaded = Loaded::default();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        match decode_line(line, line_no) {
            Ok(mut task) => {
                task.id = TaskId(loaded.tasks.len() as u64 + 1);
                loaded.tasks.push(task);
            }
            Err(e) => {
                warn!("Skipping task file entry: {e}");
                loaded.rejected += 1;
                if mode == LoadMode::StopAtFirstError {
                    loaded.stopped_at = Some(line_no);
                    break;
                }
            }
        }
    }
    loaded
}

/// Read the task file. A missing file holds zero tasks.
pub fn load(path: &Path, mode: LoadMode) -> Result<Loaded, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No task file at {}, starting empty", path.display());
            return Ok(Loaded::default());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };
    let loaded = parse(&content, mode);
    debug!(
        "Loaded {} tasks from {} ({} rejected)",
        loaded.tasks.len(),
        path.display(),
        loaded.rejected
    );
    Ok(loaded)
}

/// Overwrite the task file using atomic write (temp file + rename).
pub fn save(path: &Path, tasks: &[Task]) -> Result<(), StorageError> {
    let tmp = sibling(path, "tmp");
    write_file(&tmp, &render(tasks)).map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))?;
    debug!("Saved {} tasks to {}", tasks.len(), path.display());
    Ok(())
}

/// Copy the task file to `<file>.bak`, returning the backup path.
pub fn backup(path: &Path) -> Result<PathBuf, StorageError> {
    let dest = sibling(path, "bak");
    fs::copy(path, &dest).map_err(|e| StorageError::io(path, e))?;
    Ok(dest)
}

fn write_file(path: &Path, data: &str) -> io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data.as_bytes())?;
    f.flush()
}

/// `tasks.txt` + `bak` -> `tasks.txt.bak`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
