//! The `campus learn` command: an interactive study session.
//!
//! Enrolls in the course, shows the first page of notes, then reads
//! commands from stdin until `quit` or end of input.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use campus_core::assessment::GradingResult;
use campus_core::error::DashboardError;
use campus_core::learner::LearnerDashboard;
use campus_core::model::Question;
use campus_report::{write_certificate, CertificateLayout};

use super::{failure, flush, App};

const HELP: &str = "\
Commands:
  next | n                 next page of notes
  prev | p                 previous page of notes
  status                   show progress
  assess                   start the assessment (after 70% of the notes)
  answer <id> <answer>     answer a question; an option number also works
  submit                   grade the assessment
  retake                   start a failed assessment again
  certificate              write the certificate of a passed assessment
  help                     show this help
  quit | q                 leave";

pub async fn execute(
    config_path: Option<&Path>,
    course_id: i64,
    name: Option<String>,
) -> Result<()> {
    let app = App::load(config_path)?;
    let mut dashboard =
        LearnerDashboard::new(app.backend()?, app.session.clone()).with_notices(app.notices());
    if let Some(name) = name {
        dashboard.set_learner_name(name);
    }

    if let Err(e) = open(&mut dashboard, course_id).await {
        return Err(failure(dashboard.notices(), e));
    }
    flush(dashboard.notices_mut());
    show_page(&dashboard);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => continue,
            "next" | "n" => {
                if dashboard.next_page().await.is_ok() {
                    show_page(&dashboard);
                }
            }
            "prev" | "p" => {
                if dashboard.previous_page().await.is_ok() {
                    show_page(&dashboard);
                }
            }
            "status" => show_status(&dashboard),
            "assess" => {
                if let Ok(questions) = dashboard.prepare_assessment().await {
                    print_questions(questions);
                }
            }
            "answer" => answer(&mut dashboard, rest.trim()),
            "submit" => {
                if let Ok(result) = dashboard.submit_assessment().await {
                    print_result(&result);
                }
            }
            "retake" => {
                if dashboard.retake_assessment().is_ok() {
                    print_questions(dashboard.assessment().questions());
                }
            }
            "certificate" | "cert" => {
                if let Ok(data) = dashboard.certificate() {
                    let layout = CertificateLayout::default();
                    match write_certificate(&data, &layout, &app.config.certificate_dir) {
                        Ok(path) => println!("Certificate written to {}", path.display()),
                        Err(e) => {
                            tracing::error!(
                                error = %format!("{e:#}"),
                                "certificate rendering failed"
                            );
                            dashboard
                                .notices_mut()
                                .error("Failed to generate certificate.");
                        }
                    }
                }
            }
            "help" | "?" => println!("{HELP}"),
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command: {other}. Type `help` for a list."),
        }
        flush(dashboard.notices_mut());
    }

    Ok(())
}

/// Enroll in the course and show its first page.
async fn open(dashboard: &mut LearnerDashboard, course_id: i64) -> Result<(), DashboardError> {
    dashboard.refresh_courses().await?;
    dashboard.select_course(course_id).await?;
    dashboard.enroll().await?;
    flush(dashboard.notices_mut());
    dashboard.start_course().await?;
    Ok(())
}

fn answer(dashboard: &mut LearnerDashboard, args: &str) {
    let Some((id, value)) = args.split_once(' ') else {
        println!("Usage: answer <question id> <answer>");
        return;
    };
    let Ok(id) = id.parse::<i64>() else {
        println!("Question id must be a number.");
        return;
    };
    let value = dashboard
        .assessment()
        .questions()
        .iter()
        .find(|q| q.id == id)
        .and_then(|q| chosen_option(q, value.trim()))
        .unwrap_or_else(|| value.trim().to_string());
    if dashboard.answer(id, value.clone()).is_ok() {
        println!("Answer recorded for question {id}: {value}");
    }
}

/// The option a learner typed. An exact option literal wins; otherwise
/// `"2"` picks the second option of a multiple-choice question.
fn chosen_option(question: &Question, input: &str) -> Option<String> {
    if question.options.iter().any(|option| option == input) {
        return Some(input.to_string());
    }
    let index = input.parse::<usize>().ok()?.checked_sub(1)?;
    question.options.get(index).cloned()
}

fn show_page(dashboard: &LearnerDashboard) {
    let total = dashboard.selected_course().map(|c| c.pages).unwrap_or(0);
    if let Some(page) = dashboard.current_page() {
        println!("\n--- Page {page} of {total} ({:.0}%) ---", dashboard.progress());
    }
    println!("{}", strip_tags(dashboard.note_content()));
}

fn show_status(dashboard: &LearnerDashboard) {
    let title = dashboard
        .selected_course()
        .map(|c| c.title.as_str())
        .unwrap_or("-");
    println!("Course:     {title}");
    println!("Progress:   {:.0}%", dashboard.progress());
    println!(
        "Assessment: {}{}",
        dashboard.assessment_state(),
        if dashboard.is_assessment_unlocked() {
            ""
        } else {
            " (locked)"
        }
    );
}

fn print_questions(questions: &[Question]) {
    if questions.is_empty() {
        println!("This course has no assessment questions. Submit to finish.");
        return;
    }
    for question in questions {
        println!("\n[{}] {}", question.id, question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("    {}. {option}", i + 1);
        }
    }
}

fn print_result(result: &GradingResult) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Your answer", "Correct answer", "Result"]);
    for detail in &result.details {
        table.add_row(vec![
            Cell::new(&detail.question),
            Cell::new(&detail.user_answer),
            Cell::new(&detail.correct_answer),
            Cell::new(if detail.passed { "correct" } else { "wrong" }),
        ]);
    }
    println!("{table}");
    println!(
        "Score: {:.2}% ({}/{} marks)",
        result.percentage, result.earned_marks, result.total_marks
    );
}

/// Render note HTML as plain text for the terminal.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                if !text.ends_with('\n') && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_keeps_text() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("plain"), "plain");
        assert_eq!(strip_tags("<h1>A</h1><p>B</p>"), "A B");
    }

    #[test]
    fn option_number_selects_option() {
        let question = Question {
            id: 1,
            prompt: "Capital of France?".into(),
            options: vec!["Lyon".into(), "Paris".into()],
            answer: "Paris".into(),
        };
        assert_eq!(chosen_option(&question, "2").as_deref(), Some("Paris"));
        assert_eq!(chosen_option(&question, "Paris").as_deref(), Some("Paris"));
        assert_eq!(chosen_option(&question, "0"), None);
        assert_eq!(chosen_option(&question, "3"), None);
        assert_eq!(chosen_option(&question, "paris"), None);
    }

    #[test]
    fn numeric_option_literal_is_kept() {
        let question = Question {
            id: 4,
            prompt: "How many moons has Earth?".into(),
            options: vec!["3".into(), "2".into(), "1".into()],
            answer: "1".into(),
        };
        assert_eq!(chosen_option(&question, "1").as_deref(), Some("1"));
        assert_eq!(chosen_option(&question, "3").as_deref(), Some("3"));
    }
}
