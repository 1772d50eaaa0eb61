//! Marker lines the session asks the shell to echo.
//!
//! After spawning, the session writes a readiness probe; the shell answers
//! once it is reading stdin. With completion tracking, each tool command is
//! followed by an echo of its exit status. Marker lines are removed from
//! stdout before it reaches the console.

const TAG_PREFIX: &str = "__toolshell_";
pub const READY_TAG: &str = "__toolshell_ready__";
pub const DONE_TAG: &str = "__toolshell_done__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ready,
    Done { id: u64, exit_code: i32 },
}

pub fn ready_probe_command() -> String {
    format!("echo {}", READY_TAG)
}

/// Quoted so PowerShell prints one line rather than one per word.
pub fn completion_command(id: u64, exit_status_var: &str) -> String {
    format!("echo \"{} {} {}\"", DONE_TAG, id, exit_status_var)
}

/// Parse one complete line (terminator included or not).
pub fn parse_marker(line: &str) -> Option<Marker> {
    let mut words = line.split_whitespace();
    match words.next()? {
        READY_TAG => words.next().is_none().then_some(Marker::Ready),
        DONE_TAG => {
            let id = words.next()?.parse().ok()?;
            // PowerShell leaves $LASTEXITCODE empty until a native command has run.
            let exit_code = match words.next() {
                Some(code) => code.parse().ok()?,
                None => 0,
            };
            words
                .next()
                .is_none()
                .then_some(Marker::Done { id, exit_code })
        }
        _ => None,
    }
}

/// Output of one [`MarkerScanner::feed`] call.
#[derive(Debug, Default, PartialEq)]
pub struct Scanned {
    pub text: String,
    pub markers: Vec<Marker>,
}

/// Strips marker lines out of a text stream that arrives in arbitrary chunks.
///
/// A trailing partial line is held back only while it could still turn into
/// a marker; anything else is forwarded immediately so prompts without a
/// newline still show up.
#[derive(Debug)]
pub struct MarkerScanner {
    held: String,
    at_line_start: bool,
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self {
            held: String::new(),
            at_line_start: true,
        }
    }
}

impl MarkerScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, text: &str) -> Scanned {
        let mut data = std::mem::take(&mut self.held);
        data.push_str(text);

        let mut scanned = Scanned::default();
        for segment in data.split_inclusive('\n') {
            let starts_line = self.at_line_start;
            if segment.ends_with('\n') {
                self.at_line_start = true;
                if starts_line {
                    if let Some(marker) = parse_marker(segment) {
                        scanned.markers.push(marker);
                        continue;
                    }
                }
                scanned.text.push_str(segment);
            } else if starts_line && could_become_marker(segment) {
                self.held = segment.to_string();
            } else {
                self.at_line_start = false;
                scanned.text.push_str(segment);
            }
        }
        scanned
    }

    /// Release a held partial line (end of stream).
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.held)
    }
}

fn could_become_marker(partial: &str) -> bool {
    let partial = partial.trim_start();
    TAG_PREFIX.starts_with(partial) || partial.starts_with(TAG_PREFIX)
}
