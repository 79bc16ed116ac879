//! Terminal rendition of the form page.

use std::io::{self, BufRead, Write};

use log::error;

use crate::notify::Notifier;
use crate::view::{ElementId, ViewState};

pub const PROMPTS: [(ElementId, &str); 8] = [
    (ElementId::Age, "Age: "),
    (ElementId::Gender, "Gender (Male/Female): "),
    (ElementId::Systolic, "Systolic BP: "),
    (ElementId::Diastolic, "Diastolic BP: "),
    (ElementId::Cholesterol, "Cholesterol: "),
    (ElementId::Glucose, "Glucose: "),
    (ElementId::Bmi, "BMI: "),
    (ElementId::Smoking, "Smoking (Yes/No): "),
];

/// Elements inside the result panel, top to bottom.
const RESULT_LINES: [ElementId; 4] = [
    ElementId::HeartRisk,
    ElementId::Diabetes,
    ElementId::StrokeRisk,
    ElementId::BpCategory,
];

fn read_raw_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

/// Prompts for every field and stores the answers untouched.
/// Returns `false` if input ended before the form was complete.
pub fn fill_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    view: &mut ViewState,
) -> io::Result<bool> {
    writeln!(out, "\n--- Enter Your Health Details ---")?;
    for (id, prompt) in PROMPTS {
        write!(out, "{}", prompt)?;
        out.flush()?;
        match read_raw_line(input)? {
            Some(value) => {
                view.set_value(id, value);
            }
            None => return Ok(false),
        }
    }
    Ok(true)
}

/// Yes/no question accepting `y`/`n`; end of input counts as no.
pub fn ask_again<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    loop {
        write!(out, "\nCheck another person? (Yes/No): ")?;
        out.flush()?;
        let Some(answer) = read_raw_line(input)? else {
            return Ok(false);
        };
        match answer.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(out, "Invalid choice. Please enter one of: Yes, No")?,
        }
    }
}

/// Prints the result panel if it is visible.
pub fn render_result<W: Write>(out: &mut W, view: &ViewState) -> io::Result<()> {
    if view.result.is_hidden() {
        return Ok(());
    }
    writeln!(out, "\n--- Health Risk Report ---")?;
    for id in RESULT_LINES {
        writeln!(out, "{}", view.text(id).unwrap_or_default())?;
    }
    Ok(())
}

/// Alerts on stderr. When `blocking`, waits for Enter before returning.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    pub blocking: bool,
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "\n⚠ {}", message);
        if self.blocking {
            let _ = write!(stderr, "Press Enter to continue...");
            let _ = stderr.flush();
            let mut ack = String::new();
            if let Err(e) = io::stdin().read_line(&mut ack) {
                error!("cannot read acknowledgement: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fill_form_keeps_answers_verbatim() {
        let mut input = Cursor::new("45\n Female \n120\r\n80\n\n95\nabc\nNo\n");
        let mut out = Vec::new();
        let mut view = ViewState::default();

        assert!(fill_form(&mut input, &mut out, &mut view).unwrap());

        let read = view.form.read();
        assert_eq!(read.age, "45");
        assert_eq!(read.gender, " Female ");
        assert_eq!(read.systolic, "120");
        assert_eq!(read.cholesterol, "");
        assert_eq!(read.bmi, "abc");
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Smoking (Yes/No): "));
    }

    #[test]
    fn fill_form_reports_truncated_input() {
        let mut input = Cursor::new("45\nMale\n");
        let mut view = ViewState::default();
        assert!(!fill_form(&mut input, &mut Vec::new(), &mut view).unwrap());
    }

    #[test]
    fn ask_again_accepts_shortcuts_and_retries() {
        let mut out = Vec::new();
        assert!(ask_again(&mut Cursor::new("maybe\nY\n"), &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice"));
        assert!(!ask_again(&mut Cursor::new(" no \n"), &mut Vec::new()).unwrap());
        assert!(!ask_again(&mut Cursor::new(""), &mut Vec::new()).unwrap());
    }

    #[test]
    fn render_result_only_when_visible() {
        let mut view = ViewState::default();
        let mut out = Vec::new();
        render_result(&mut out, &view).unwrap();
        assert!(out.is_empty());

        view.bp_category = "💓 Blood Pressure: Normal".into();
        view.result.remove_hidden();
        render_result(&mut out, &view).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("💓 Blood Pressure: Normal\n"));
    }
}
