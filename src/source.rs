// Label stream input: the seam where camera + classifier output enters

use crate::error::{Result, SteadyEmotionError};
use crate::models::LabelFrame;
use std::io::BufRead;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::debug;

/// Anything that yields classified frames, one per processed camera frame
#[allow(async_fn_in_trait)]
pub trait LabelSource {
    /// Next frame, or None when the stream has ended
    async fn next_frame(&mut self) -> Result<Option<LabelFrame>>;
}

/// Monotonic seconds since the session started
#[derive(Debug, Clone, Copy)]
pub struct SessionTimer {
    start: Instant,
}

impl SessionTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub label: String,
    /// Explicit timestamp; None means "stamp on arrival"
    pub timestamp: Option<f64>,
}

/// Parses `<label>` or `<seconds> <label>`. Blank lines and `#` comments yield None.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ParsedLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let parsed = match tokens.as_slice() {
        [label] => ParsedLine {
            label: label.to_lowercase(),
            timestamp: None,
        },
        [secs, label] => {
            let timestamp: f64 = secs.parse().map_err(|_| SteadyEmotionError::LabelParse {
                line: line_no,
                reason: format!("expected '<seconds> <label>', got timestamp '{secs}'"),
            })?;
            if !timestamp.is_finite() || timestamp < 0.0 {
                return Err(SteadyEmotionError::LabelParse {
                    line: line_no,
                    reason: format!("timestamp must be a non-negative number, got {secs}"),
                });
            }
            ParsedLine {
                label: label.to_lowercase(),
                timestamp: Some(timestamp),
            }
        }
        _ => {
            return Err(SteadyEmotionError::LabelParse {
                line: line_no,
                reason: format!("expected '<label>' or '<seconds> <label>', got '{line}'"),
            })
        }
    };
    Ok(Some(parsed))
}

/// Reads frames from a line-oriented stream (a replay file, stdin, or a
/// classifier process piping its output)
pub struct LineSource<R> {
    lines: Lines<R>,
    line_no: usize,
    timer: SessionTimer,
}

impl<R: AsyncBufRead + Unpin> LineSource<R> {
    pub fn new(reader: R, timer: SessionTimer) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            timer,
        }
    }
}

impl<R: AsyncBufRead + Unpin> LabelSource for LineSource<R> {
    async fn next_frame(&mut self) -> Result<Option<LabelFrame>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            if let Some(parsed) = parse_line(&line, self.line_no)? {
                let timestamp = parsed.timestamp.unwrap_or_else(|| self.timer.now_secs());
                debug!("Line {}: {} at {:.3}s", self.line_no, parsed.label, timestamp);
                return Ok(Some(LabelFrame::new(parsed.label, timestamp)));
            }
        }
        Ok(None)
    }
}

/// Blocking reader loop for a plain thread: parses lines and sends frames
/// until input ends, a line fails to parse, or the receiver goes away.
///
/// Meant for stdin, whose reads cannot be cancelled from async code.
pub fn forward_lines<R: BufRead>(
    reader: R,
    timer: SessionTimer,
    sender: mpsc::Sender<LabelFrame>,
) -> Result<()> {
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(parsed) = parse_line(&line, index + 1)? else {
            continue;
        };
        let timestamp = parsed.timestamp.unwrap_or_else(|| timer.now_secs());
        if sender
            .blocking_send(LabelFrame::new(parsed.label, timestamp))
            .is_err()
        {
            debug!("Frame receiver closed, reader stopping at line {}", index + 1);
            break;
        }
    }
    Ok(())
}
