//! Plain-text rendering of the conference program and speaker views.

use chrono::{DateTime, FixedOffset, Utc};

use crate::database::models::{Participant, QuestionWithAuthor, SpeechDetails};
use crate::utils::datetime::format_time_range;

/// Where a speech sits relative to the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechStatus {
    Live,
    Upcoming,
    Finished,
}

impl SpeechStatus {
    /// Both ends of the slot are inclusive.
    pub fn at(start: &DateTime<Utc>, end: &DateTime<Utc>, now: &DateTime<Utc>) -> Self {
        if start <= now && now <= end {
            SpeechStatus::Live
        } else if now < start {
            SpeechStatus::Upcoming
        } else {
            SpeechStatus::Finished
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeechStatus::Live => "Now",
            SpeechStatus::Upcoming => "Upcoming",
            SpeechStatus::Finished => "Finished",
        }
    }
}

/// One block per event, speeches in the order given.
pub fn render_schedule(speeches: &[SpeechDetails], now: DateTime<Utc>, offset: FixedOffset) -> String {
    let mut text = String::new();
    let mut current_event = None;

    for speech in speeches {
        if current_event != Some(speech.event_id) {
            current_event = Some(speech.event_id);
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("Program: {}\n\n", speech.event_title));
        }

        let status = SpeechStatus::at(&speech.start_time, &speech.end_time, &now);
        text.push_str(&format!(
            "{}, {}\n",
            status.label(),
            format_time_range(&speech.start_time, &speech.end_time, offset)
        ));
        text.push_str(&format!("speaker - {}\n", speech.speaker_name));
        text.push_str(&format!("topic: {}\n\n", speech.title));
    }

    text
}

pub fn render_speaker_questions(speech_title: &str, questions: &[QuestionWithAuthor]) -> String {
    let header = format!("Questions for your talk:\n«{speech_title}»\n\n");

    let lines: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let username = question.username.as_deref().filter(|u| !u.is_empty());
            let name = match (question.full_name.trim(), username) {
                ("", Some(username)) => username.to_string(),
                ("", None) => "no username".to_string(),
                (full_name, _) => full_name.to_string(),
            };
            let contact = match username {
                Some(username) => format!("@{username}"),
                None => "contact: no username".to_string(),
            };

            format!(
                "{}. From {} ({}):\n   {}\n",
                index + 1,
                name,
                contact,
                question.question_text
            )
        })
        .collect();

    header + &lines.join("\n")
}

pub fn render_networking(participants: &[Participant]) -> String {
    let mut text = String::from("🤝 People you might want to meet:\n\n");

    for participant in participants {
        text.push_str(&format!("• {}\n", participant.display_name()));

        let role = match (participant.position.as_deref(), participant.company.as_deref()) {
            (Some(position), Some(company)) => format!("{position} at {company}"),
            (Some(position), None) => position.to_string(),
            (None, Some(company)) => company.to_string(),
            (None, None) => String::new(),
        };
        if !role.is_empty() {
            text.push_str(&format!("  {role}\n"));
        }
        if let Some(experience) = participant.experience.as_deref() {
            text.push_str(&format!("  experience: {experience}\n"));
        }
        if let Some(username) = participant.username.as_deref().filter(|u| !u.is_empty()) {
            text.push_str(&format!("  contact: @{username}\n"));
        }
        text.push('\n');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn speech(id: i64, event_id: i64, event_title: &str, start: DateTime<Utc>) -> SpeechDetails {
        SpeechDetails {
            id,
            event_id,
            event_title: event_title.to_string(),
            speaker_id: 1,
            speaker_name: "Ada".to_string(),
            title: format!("Talk {id}"),
            start_time: start,
            end_time: start + Duration::minutes(45),
            is_active: true,
        }
    }

    #[test]
    fn test_status_boundaries_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let end = start + Duration::hours(1);

        assert_eq!(SpeechStatus::at(&start, &end, &start), SpeechStatus::Live);
        assert_eq!(SpeechStatus::at(&start, &end, &end), SpeechStatus::Live);
        assert_eq!(
            SpeechStatus::at(&start, &end, &(start - Duration::seconds(1))),
            SpeechStatus::Upcoming
        );
        assert_eq!(
            SpeechStatus::at(&start, &end, &(end + Duration::seconds(1))),
            SpeechStatus::Finished
        );
    }

    #[test]
    fn test_render_schedule_groups_by_event() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let speeches = vec![
            speech(1, 1, "RustConf", base),
            speech(2, 1, "RustConf", base + Duration::hours(1)),
            speech(3, 2, "EuroRust", base + Duration::days(30)),
        ];

        let text = render_schedule(&speeches, base + Duration::minutes(10), offset);

        assert_eq!(text.matches("Program: RustConf").count(), 1);
        assert_eq!(text.matches("Program: EuroRust").count(), 1);
        assert!(text.starts_with(
            "Program: RustConf\n\nNow, 01.06.2024 10:00-10:45\nspeaker - Ada\ntopic: Talk 1\n\n"
        ));
        assert!(text.contains("Upcoming, 01.06.2024 11:00-11:45\n"));
        assert!(text.contains("\n\nProgram: EuroRust\n\n"));
    }

    #[test]
    fn test_render_speaker_questions_numbering_and_contacts() {
        let question = |id: i64, username: Option<&str>, full_name: &str| QuestionWithAuthor {
            id,
            speech_id: 1,
            speech_title: "Ownership".to_string(),
            participant_id: id,
            telegram_id: 100 + id,
            username: username.map(str::to_string),
            full_name: full_name.to_string(),
            question_text: format!("Question {id}?"),
            is_answered: false,
            created_at: Utc::now(),
        };

        let text = render_speaker_questions(
            "Ownership",
            &[question(1, Some("grace"), "Grace Hopper"), question(2, None, "")],
        );

        assert!(text.starts_with("Questions for your talk:\n«Ownership»\n\n"));
        assert!(text.contains("1. From Grace Hopper (@grace):\n   Question 1?\n"));
        assert!(text.contains("2. From no username (contact: no username):\n   Question 2?\n"));
    }
}
