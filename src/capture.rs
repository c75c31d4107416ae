//! Capture file replay
//!
//! A capture is plain text with one frame per line: pulse durations in µs,
//! separated by commas or whitespace, first mark first. `#` starts a comment.

use std::path::{Path, PathBuf};

use irkey_protocol::{IrReceiver, ParseFrameError, QueueReceiver, RawFrame};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseFrameError,
    },
}

/// Parse capture text into frames
pub fn parse_capture(text: &str) -> Result<Vec<RawFrame>, CaptureError> {
    let mut frames = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let data = line.split('#').next().unwrap_or_default().trim();
        if data.is_empty() {
            continue;
        }
        let frame = data.parse::<RawFrame>().map_err(|source| CaptureError::Parse {
            line: i + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Render frames in capture format
pub fn format_capture(frames: &[RawFrame]) -> String {
    frames.iter().map(|f| format!("{f}\n")).collect()
}

/// Receiver that plays back a capture file
#[derive(Debug)]
pub struct ReplayReceiver {
    source: PathBuf,
    queue: QueueReceiver,
    total: usize,
}

impl ReplayReceiver {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let text = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut receiver = Self::from_text(&text)?;
        receiver.source = path.to_path_buf();
        debug!("Loaded {} frames from {}", receiver.total, path.display());
        Ok(receiver)
    }

    pub fn from_text(text: &str) -> Result<Self, CaptureError> {
        Ok(Self::from_frames(parse_capture(text)?))
    }

    pub fn from_frames(frames: Vec<RawFrame>) -> Self {
        Self {
            source: PathBuf::from("<memory>"),
            total: frames.len(),
            queue: QueueReceiver::new(frames),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Frames in the capture
    pub fn total(&self) -> usize {
        self.total
    }

    /// Frames not yet consumed
    pub fn remaining(&self) -> usize {
        self.queue.pending()
    }

    pub fn rearm_count(&self) -> usize {
        self.queue.rearm_count()
    }
}

impl IrReceiver for ReplayReceiver {
    fn try_receive(&mut self) -> Option<RawFrame> {
        self.queue.try_receive()
    }

    fn rearm(&mut self) {
        self.queue.rearm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines() {
        let frames = parse_capture(
            "# two frames\n\
             1000, 500, 500, 450\n\
             \n\
             1200 600 600   # trailing comment\n",
        )
        .unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].pulses(), &[1000, 500, 500, 450]);
        assert_eq!(frames[1].pulses(), &[1200, 600, 600]);
    }

    #[test]
    fn test_bad_duration_reports_line() {
        let err = parse_capture("1000,500\n1000,abc\n").unwrap_err();
        match err {
            CaptureError::Parse { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source, ParseFrameError::InvalidDuration("abc".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_format_parses_back() {
        let frames = vec![RawFrame::new(vec![1000, 500]), RawFrame::new(vec![1200])];
        assert_eq!(parse_capture(&format_capture(&frames)).unwrap(), frames);
    }

    #[test]
    fn test_replay_holds_frame_until_rearm() {
        let mut rx = ReplayReceiver::from_text("1\n2\n").unwrap();
        assert_eq!(rx.total(), 2);
        assert_eq!(rx.try_receive(), Some(RawFrame::new(vec![1])));
        assert_eq!(rx.try_receive(), Some(RawFrame::new(vec![1])));
        rx.rearm();
        assert_eq!(rx.try_receive(), Some(RawFrame::new(vec![2])));
        rx.rearm();
        assert_eq!(rx.try_receive(), None);
        assert_eq!(rx.rearm_count(), 2);
        assert_eq!(rx.remaining(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = ReplayReceiver::open(Path::new("/nonexistent/capture.txt")).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
    }
}
