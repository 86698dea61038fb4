//! The block of terminal lines an animation redraws in place.

use crossterm::{
    cursor::{Hide, MoveUp, Show},
    queue,
    terminal::{Clear, ClearType},
};
use std::io;

use crate::output::Output;

/// A live region at the bottom of the output.
///
/// The cursor is hidden while the region exists. Each [`draw`](Self::draw)
/// erases what the previous one wrote and writes the new lines in a single
/// write. Dropping the region erases it and restores the cursor, leaving the
/// cursor at the start of the line where the region began.
pub(crate) struct LiveRegion {
    output: Output,
    height: usize,
}

impl LiveRegion {
    pub(crate) fn new(output: Output) -> Self {
        let mut buf: Vec<u8> = Vec::new();
        if let Err(err) = queue!(buf, Hide) {
            log::warn!("clog: cannot hide cursor: {err}");
        }
        output.write_bytes(&buf);
        Self { output, height: 0 }
    }

    pub(crate) fn draw(&mut self, lines: &[String]) {
        let mut buf: Vec<u8> = Vec::new();
        if let Err(err) = erase(&mut buf, self.height) {
            log::warn!("clog: cannot erase frame: {err}");
        }
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                buf.push(b'\n');
            }
            buf.extend_from_slice(line.as_bytes());
        }
        self.height = lines.len();
        self.output.write_bytes(&buf);
    }
}

impl Drop for LiveRegion {
    fn drop(&mut self) {
        let mut buf: Vec<u8> = Vec::new();
        let result = erase(&mut buf, self.height).and_then(|()| queue!(buf, Show));
        if let Err(err) = result {
            log::warn!("clog: cannot restore terminal: {err}");
        }
        self.height = 0;
        self.output.write_bytes(&buf);
    }
}

/// Erases `height` lines upwards from the cursor's line.
fn erase(buf: &mut Vec<u8>, height: usize) -> io::Result<()> {
    for i in 0..height {
        queue!(buf, Clear(ClearType::CurrentLine))?;
        buf.push(b'\r');
        if i + 1 < height {
            queue!(buf, MoveUp(1))?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod screen {
    //! Minimal terminal emulator for asserting on what a user would see.

    /// Replays `bytes` and returns the visible lines, trailing blanks trimmed.
    ///
    /// Understands `\n`, `\r`, erase-line and cursor-up; every other escape
    /// sequence is skipped.
    pub(crate) fn replay(bytes: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(bytes);
        let mut lines: Vec<Vec<char>> = vec![Vec::new()];
        let (mut row, mut col) = (0usize, 0usize);
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\n' => {
                    row += 1;
                    col = 0;
                    if lines.len() <= row {
                        lines.push(Vec::new());
                    }
                }
                '\r' => col = 0,
                '\x1b' => {
                    if chars.peek() != Some(&'[') {
                        continue;
                    }
                    chars.next();
                    let mut params = String::new();
                    let mut command = None;
                    for c in chars.by_ref() {
                        if c.is_ascii_alphabetic() || c == '~' {
                            command = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    let n: usize = params.parse().unwrap_or(1);
                    match command {
                        Some('A') => row = row.saturating_sub(n),
                        Some('K') if params == "2" => lines[row].clear(),
                        _ => {}
                    }
                }
                c => {
                    let line = &mut lines[row];
                    if line.len() <= col {
                        line.resize(col, ' ');
                        line.push(c);
                    } else {
                        line[col] = c;
                    }
                    col += 1;
                }
            }
        }
        let mut out: Vec<String> = lines
            .into_iter()
            .map(|l| l.into_iter().collect::<String>().trim_end().to_string())
            .collect();
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedBuffer;

    #[test]
    fn redraw_replaces_the_block() {
        let buffer = SharedBuffer::new();
        {
            let mut region = LiveRegion::new(Output::new(buffer.clone()));
            region.draw(&["one".into(), "two".into()]);
            region.draw(&["three".into()]);
            assert_eq!(screen::replay(&buffer.bytes()), ["three"]);
        }
        assert!(screen::replay(&buffer.bytes()).is_empty());
    }

    #[test]
    fn dropping_restores_the_cursor() {
        let buffer = SharedBuffer::new();
        drop(LiveRegion::new(Output::new(buffer.clone())));
        let raw = buffer.contents();
        assert!(raw.contains("\x1b[?25l"));
        assert!(raw.ends_with("\x1b[?25h"));
    }

    #[test]
    fn lines_after_the_region_start_where_it_began() {
        let buffer = SharedBuffer::new();
        let output = Output::new(buffer.clone());
        output.write_line("before");
        {
            let mut region = LiveRegion::new(output.clone());
            region.draw(&["a".into(), "b".into(), "c".into()]);
        }
        output.write_line("after");
        assert_eq!(screen::replay(&buffer.bytes()), ["before", "after"]);
    }
}
