//! Prompt protection and history recall over long mixed edit sequences.

use toolshell::config::ConsoleConfig;
use toolshell::console::{CommandHistory, Console, ConsoleAction, LineBuffer};
use toolshell::shell::{OutputSource, ShellEvent};

const PROMPT: &str = "PS> ";

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next() as usize) % items.len()]
    }
}

fn assert_caret_after_prompt(buffer: &LineBuffer, step: usize) {
    if buffer.prompt_shown() {
        assert!(
            buffer.last_line().starts_with(PROMPT),
            "step {}: last line {:?} lost its prompt",
            step,
            buffer.last_line()
        );
        assert!(
            buffer.caret_column() >= PROMPT.chars().count(),
            "step {}: caret at column {} inside prompt",
            step,
            buffer.caret_column()
        );
    }
    assert!(buffer.caret() >= buffer.input_start(), "step {}", step);
    assert!(!buffer.input().contains('\n'), "step {}", step);
}

#[test]
fn prompt_survives_random_edits_and_output() {
    let outputs = ["line\n", "a\nb\n", "partial", "\n", "终端输出\n", "x\r\n"];
    let typed = ["l", "s -la", "é", "\t", "paste\nwith break"];
    let mut rng = Lcg(7);
    let mut buffer = LineBuffer::new(PROMPT).with_max_lines(50);

    for step in 0..5_000 {
        match rng.next() % 10 {
            0 => buffer.append_output(rng.pick(&outputs)),
            1 => {
                buffer.insert(rng.pick(&typed));
            }
            2 => {
                buffer.backspace();
            }
            3 => {
                buffer.delete();
            }
            4 => {
                buffer.move_left();
            }
            5 => {
                buffer.move_right();
            }
            6 => {
                buffer.move_home();
            }
            7 => {
                buffer.move_end();
            }
            8 => {
                buffer.submit();
            }
            _ => buffer.echo_command("make all"),
        }
        assert_caret_after_prompt(&buffer, step);
        assert!(buffer.line_count() <= 50);
    }
}

#[test]
fn output_ending_in_newline_always_ends_with_single_prompt() {
    let mut buffer = LineBuffer::new(PROMPT);
    for chunk in ["one\n", "two\nthree\n", "PS> \n", "\n"] {
        buffer.append_output(chunk);
        assert!(buffer.text().ends_with(&format!("\n{}", PROMPT)));
        assert_eq!(buffer.last_line(), PROMPT);
    }
}

#[test]
fn history_walks_back_to_oldest_and_stays() {
    let mut history = CommandHistory::new(10);
    for command in ["a", "b", "c"] {
        history.push(command);
    }
    let recalled: Vec<_> = (0..4)
        .map(|_| history.recall_up("").map(str::to_string))
        .collect();
    assert_eq!(
        recalled,
        vec![
            Some("c".to_string()),
            Some("b".to_string()),
            Some("a".to_string()),
            Some("a".to_string())
        ]
    );
}

#[test]
fn console_transcript_of_a_session() {
    let mut console = Console::new(&ConsoleConfig::default());
    console.on_shell_event(&ShellEvent::Started {
        program: "/bin/sh".into(),
        cwd: "/ws".into(),
        pid: Some(42),
    });
    console.apply(ConsoleAction::Insert("echo hi".into()));
    console.apply(ConsoleAction::Submit);
    console.on_shell_event(&ShellEvent::Output {
        source: OutputSource::Stdout,
        text: "hi\n".into(),
    });
    console.on_shell_event(&ShellEvent::Exited { code: Some(0) });

    assert_eq!(
        console.buffer().text(),
        "/bin/sh started\nWorking directory: /ws\nPS> echo hi\nhi\n[shell exited with code 0]\nPS> "
    );
}
