use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use log::{debug, trace};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Storage, StorageError, keep_last, pick};
use crate::models::WorkoutEntry;

const LOG_PREFIX: &str = "workout-";
const LOG_EXTENSION: &str = "log";

/// Year-partitioned flat files, one `workout-<YYYY>.log` per calendar year.
///
/// Not safe against concurrent writers: removal rewrites the whole year file
/// from a snapshot, so an append landing between the read and the rewrite is
/// lost.
#[derive(Debug, Clone)]
pub struct FileStorage {
    log_dir: PathBuf,
}

/// Year encoded in the first four characters of `date`, or the current year.
pub fn year_from_date(date: &str) -> i32 {
    date.get(..4)
        .and_then(|y| y.parse::<i32>().ok())
        .unwrap_or_else(current_year)
}

fn current_year() -> i32 {
    Local::now().year()
}

fn is_match(entry: &WorkoutEntry, date: &str) -> bool {
    entry.date == date
}

fn parse_lines(content: &str) -> impl Iterator<Item = WorkoutEntry> + '_ {
    content
        .lines()
        .filter_map(|line| WorkoutEntry::from_line(line.trim()))
}

/// Drop the `index`-th line dated `date` from `content` and return the text
/// to write back. Unparseable lines are kept untouched.
pub(crate) fn remove_line(content: &str, date: &str, index: usize) -> Result<String, StorageError> {
    let lines: Vec<&str> = content.lines().collect();

    let matching: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            WorkoutEntry::from_line(line.trim()).is_some_and(|e| is_match(&e, date))
        })
        .map(|(n, _)| n)
        .collect();

    let target = pick(&matching, index)?;

    let mut out = String::with_capacity(content.len());
    for (n, line) in lines.iter().enumerate() {
        if n == target {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

impl FileStorage {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// `~/cali-logger/workout`
    pub fn default_dir() -> Result<PathBuf, StorageError> {
        dirs::home_dir()
            .map(|home| home.join("cali-logger").join("workout"))
            .ok_or_else(|| StorageError::Config("could not determine home directory".into()))
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn year_file(&self, year: i32) -> PathBuf {
        self.log_dir
            .join(format!("{LOG_PREFIX}{year}.{LOG_EXTENSION}"))
    }

    /// Contents of a year file, `None` when it does not exist.
    async fn read_year(&self, year: i32) -> Result<Option<String>, StorageError> {
        let path = self.year_file(year);
        trace!("reading {}", path.display());

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(
                format!("Failed to read workout log {}", path.display()),
                e,
            )),
        }
    }
}

impl Storage for FileStorage {
    async fn append(&self, entry: &WorkoutEntry) -> Result<(), StorageError> {
        fs::create_dir_all(&self.log_dir).await.map_err(|e| {
            StorageError::io(
                format!("Failed to create directory: {}", self.log_dir.display()),
                e,
            )
        })?;

        let path = self.year_file(year_from_date(&entry.date));
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::io(format!("Failed to open {}", path.display()), e))?;

        file.write_all(entry.to_line().as_bytes())
            .await
            .map_err(|e| StorageError::io(format!("Failed to write {}", path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(format!("Failed to write {}", path.display()), e))?;

        debug!("appended {} entry to {}", entry.date, path.display());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<WorkoutEntry>, StorageError> {
        let Some(content) = self.read_year(current_year()).await? else {
            return Ok(Vec::new());
        };
        Ok(keep_last(parse_lines(&content).collect(), limit))
    }

    async fn search_by_date(&self, date: &str) -> Result<Vec<WorkoutEntry>, StorageError> {
        let Some(content) = self.read_year(year_from_date(date)).await? else {
            return Ok(Vec::new());
        };
        Ok(parse_lines(&content).filter(|e| is_match(e, date)).collect())
    }

    async fn remove_by_date_index(&self, date: &str, index: usize) -> Result<(), StorageError> {
        let year = year_from_date(date);
        let Some(content) = self.read_year(year).await? else {
            return Err(StorageError::MissingYearLog { year });
        };

        let remaining = remove_line(&content, date, index)?;

        let path = self.year_file(year);
        fs::write(&path, remaining)
            .await
            .map_err(|e| StorageError::io(format!("Failed to rewrite {}", path.display()), e))?;

        debug!("removed entry {index} for {date} from {}", path.display());
        Ok(())
    }

    async fn last_training_day(&self) -> Result<Option<(String, String)>, StorageError> {
        let Some(content) = self.read_year(current_year()).await? else {
            return Ok(None);
        };
        Ok(parse_lines(&content).last().map(|e| (e.day, e.date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn this_year_date(day: u32) -> String {
        format!("{}-01-{:02}", current_year(), day)
    }

    fn entry(date: &str, day: &str, exercise: &str, level: &str, reps: &str) -> WorkoutEntry {
        WorkoutEntry::new(&CATALOG, date, day, exercise, level, reps, "")
    }

    fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("cali-logger").join("workout"));
        (dir, storage)
    }

    async fn read(storage: &FileStorage, year: i32) -> String {
        fs::read_to_string(storage.year_file(year)).await.unwrap()
    }

    #[test]
    fn year_comes_from_date_prefix() {
        assert_eq!(year_from_date("2026-01-24"), 2026);
        assert_eq!(year_from_date("1999"), 1999);
        assert_eq!(year_from_date("26-1"), current_year());
        assert_eq!(year_from_date("abcd-01-01"), current_year());
        assert_eq!(year_from_date(""), current_year());
    }

    #[tokio::test]
    async fn empty_store_reads_empty() {
        let (_dir, storage) = storage();
        assert!(storage.recent(10).await.unwrap().is_empty());
        assert!(storage.search_by_date("2026-01-24").await.unwrap().is_empty());
        assert_eq!(storage.last_training_day().await.unwrap(), None);
    }

    #[tokio::test]
    async fn append_creates_year_file() {
        let (_dir, storage) = storage();
        let e = entry("2026-01-24", "A", "Pushups", "Half", "20x2");
        storage.append(&e).await.unwrap();

        assert_eq!(read(&storage, 2026).await, "2026-01-24|A|Pushups|Half|20x2|25x2|\n");
    }

    #[tokio::test]
    async fn entries_are_partitioned_by_year() {
        let (_dir, storage) = storage();
        storage
            .append(&entry("2025-12-31", "C", "Bridges", "Short", "50x3"))
            .await
            .unwrap();
        storage
            .append(&entry("2026-01-01", "A", "Squats", "Full", "30x2"))
            .await
            .unwrap();

        assert_eq!(read(&storage, 2025).await.lines().count(), 1);
        assert_eq!(read(&storage, 2026).await.lines().count(), 1);
    }

    #[tokio::test]
    async fn search_returns_same_date_entries_in_append_order() {
        let (_dir, storage) = storage();
        let first = entry("2026-01-24", "A", "Pushups", "Half", "20x2");
        let other = entry("2026-01-25", "B", "Pullups", "Full", "8x2");
        let second = entry("2026-01-24", "A", "Squats", "Half", "40x2");
        for e in [&first, &other, &second] {
            storage.append(e).await.unwrap();
        }

        assert_eq!(
            storage.search_by_date("2026-01-24").await.unwrap(),
            vec![first, second]
        );
        assert!(storage.search_by_date("2026-01-23").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_compares_whole_date_field() {
        let (_dir, storage) = storage();
        storage
            .append(&entry("2026-01-24", "A", "Pushups", "Half", "20x2"))
            .await
            .unwrap();
        storage
            .append(&entry("2026-01-20", "A", "Pushups", "Half", "20x2"))
            .await
            .unwrap();

        assert!(storage.search_by_date("2026-01-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let (_dir, storage) = storage();
        let year = current_year();
        fs::create_dir_all(storage.log_dir()).await.unwrap();
        fs::write(
            storage.year_file(year),
            format!(
                "\n{d}|A|Pushups\ngarbage\n{d}|A|Pushups|Full|20x2|20x2|ok\n   \n",
                d = this_year_date(3)
            ),
        )
        .await
        .unwrap();

        let recent = storage.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].comment, "ok");
        assert_eq!(storage.search_by_date(&this_year_date(3)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recent_keeps_latest_in_order() {
        let (_dir, storage) = storage();
        for day in 1..=12 {
            storage
                .append(&entry(&this_year_date(day), "A", "Pushups", "Wall", &format!("{day}x3")))
                .await
                .unwrap();
        }
        // Another year never shows up in recent.
        storage
            .append(&entry("1999-01-01", "A", "Pushups", "Wall", "1x1"))
            .await
            .unwrap();

        let recent = storage.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].date, this_year_date(3));
        assert_eq!(recent[9].date, this_year_date(12));

        assert_eq!(storage.recent(3).await.unwrap().len(), 3);
        assert!(storage.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn last_training_day_is_last_parsed_line() {
        let (_dir, storage) = storage();
        storage
            .append(&entry(&this_year_date(1), "A", "Pushups", "Wall", "10x3"))
            .await
            .unwrap();
        storage
            .append(&entry(&this_year_date(2), "B", "Pullups", "Vertical", "10x3"))
            .await
            .unwrap();
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(storage.year_file(current_year()))
            .await
            .unwrap();
        file.write_all(b"not a record\n").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(
            storage.last_training_day().await.unwrap(),
            Some(("B".to_string(), this_year_date(2)))
        );
    }

    #[tokio::test]
    async fn remove_drops_exactly_one_match() {
        let (_dir, storage) = storage();
        let a = entry("2026-01-24", "A", "Pushups", "Half", "20x2");
        let b = entry("2026-01-25", "B", "Pullups", "Full", "8x2");
        let c = entry("2026-01-24", "A", "Squats", "Half", "40x2");
        let d = entry("2026-01-24", "A", "Squats", "Full", "20x2");
        for e in [&a, &b, &c, &d] {
            storage.append(e).await.unwrap();
        }

        storage.remove_by_date_index("2026-01-24", 1).await.unwrap();

        assert_eq!(
            storage.search_by_date("2026-01-24").await.unwrap(),
            vec![a.clone(), d.clone()]
        );
        assert_eq!(
            storage.search_by_date("2026-01-25").await.unwrap(),
            vec![b.clone()]
        );
        assert_eq!(
            read(&storage, 2026).await,
            [a.to_line(), b.to_line(), d.to_line()].concat()
        );

        // Same index again hits the next logical entry, then runs out.
        storage.remove_by_date_index("2026-01-24", 1).await.unwrap();
        assert_eq!(storage.search_by_date("2026-01-24").await.unwrap(), vec![a]);
        assert!(matches!(
            storage.remove_by_date_index("2026-01-24", 1).await,
            Err(StorageError::InvalidIndex { index: 1, matches: 1 })
        ));
    }

    #[tokio::test]
    async fn remove_out_of_range_leaves_file_untouched() {
        let (_dir, storage) = storage();
        storage
            .append(&entry("2026-01-24", "A", "Pushups", "Half", "20x2"))
            .await
            .unwrap();
        let before = read(&storage, 2026).await;

        assert!(matches!(
            storage.remove_by_date_index("2026-01-24", 1).await,
            Err(StorageError::InvalidIndex { .. })
        ));
        assert!(matches!(
            storage.remove_by_date_index("2026-01-23", 0).await,
            Err(StorageError::InvalidIndex { matches: 0, .. })
        ));
        assert_eq!(read(&storage, 2026).await, before);
    }

    #[tokio::test]
    async fn remove_without_year_file_fails() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.remove_by_date_index("2024-05-01", 0).await,
            Err(StorageError::MissingYearLog { year: 2024 })
        ));
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.year_file(current_year())).await.unwrap();

        assert!(matches!(
            storage.recent(10).await,
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn remove_line_keeps_unparseable_lines() {
        let content = "junk\n2026-01-24|A|Pushups|Half|20x2|25x2|\n\n2026-01-24|A|Squats|Half|40x2|50x2|\n";
        assert_eq!(
            remove_line(content, "2026-01-24", 0).unwrap(),
            "junk\n\n2026-01-24|A|Squats|Half|40x2|50x2|\n"
        );
    }

    #[tokio::test]
    async fn concurrent_append_during_removal_is_lost() {
        let (_dir, storage) = storage();
        storage
            .append(&entry("2026-01-24", "A", "Pushups", "Half", "20x2"))
            .await
            .unwrap();
        storage
            .append(&entry("2026-01-24", "A", "Squats", "Half", "40x2"))
            .await
            .unwrap();

        // A removal reads its snapshot...
        let snapshot = read(&storage, 2026).await;
        // ...another invocation appends meanwhile...
        storage
            .append(&entry("2026-01-24", "B", "Pullups", "Half", "10x2"))
            .await
            .unwrap();
        // ...and the rewrite from the snapshot wins.
        fs::write(storage.year_file(2026), remove_line(&snapshot, "2026-01-24", 0).unwrap())
            .await
            .unwrap();

        let left = storage.search_by_date("2026-01-24").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].exercise, "Squats");
    }
}
