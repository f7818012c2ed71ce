//! Filling in a questionnaire.
//!
//! A [`ResponseSession`] walks a respondent through the questions one step at
//! a time, the way the preview and public questionnaire pages do, collects
//! answers and finally checks them all before producing a
//! [`QuestionnaireResponse`].

use std::collections::BTreeMap;

use formwright_data::{Answer, Id, Question, QuestionType, Questionnaire, QuestionnaireResponse};
use log::info;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::idgen::prefixed_id;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("questionnaire has no question '{0}'")]
    UnknownQuestion(Id),
    #[error("question '{0}' requires an answer")]
    MissingAnswer(Id),
    #[error("question '{question}': {message}")]
    Rejected { question: Id, message: String },
    #[error("question '{question}' has an unusable pattern: {reason}")]
    InvalidPattern { question: Id, reason: String },
    #[error("this questionnaire does not accept anonymous responses")]
    AnonymousNotAllowed,
}

/// In-progress answers to one questionnaire.
#[derive(Debug, Clone)]
pub struct ResponseSession<'q> {
    questionnaire: &'q Questionnaire,
    order: Vec<usize>,
    answers: BTreeMap<Id, Answer>,
    step: usize,
}

impl<'q> ResponseSession<'q> {
    /// Start at the first question, shuffling the order if the questionnaire
    /// asks for it.
    pub fn start(questionnaire: &'q Questionnaire) -> Self {
        Self::start_with_rng(questionnaire, &mut rand::rng())
    }

    /// Like [`start`](Self::start) with a caller-supplied random source.
    pub fn start_with_rng<R: Rng + ?Sized>(questionnaire: &'q Questionnaire, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..questionnaire.questions.len()).collect();
        if questionnaire.settings.randomize_questions {
            order.shuffle(rng);
        }
        Self {
            questionnaire,
            order,
            answers: BTreeMap::new(),
            step: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Zero-based index of the current step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> impl Iterator<Item = &'q Question> + '_ {
        let questionnaire = self.questionnaire;
        self.order.iter().map(move |&i| &questionnaire.questions[i])
    }

    pub fn current_question(&self) -> Option<&'q Question> {
        let questionnaire = self.questionnaire;
        self.order.get(self.step).map(|&i| &questionnaire.questions[i])
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Record (or replace) the answer to `question_id`.
    ///
    /// # Errors
    /// `UnknownQuestion` if the questionnaire has no such question.
    pub fn answer(&mut self, question_id: &str, answer: Answer) -> Result<(), ResponseError> {
        let question = self.question(question_id)?;
        self.answers.insert(question.id.clone(), answer);
        Ok(())
    }

    /// Tick or untick `value` in a multi-choice answer.
    ///
    /// # Errors
    /// `UnknownQuestion` if the questionnaire has no such question.
    pub fn toggle_choice(&mut self, question_id: &str, value: &str, checked: bool) -> Result<(), ResponseError> {
        let question = self.question(question_id)?;
        let mut values = match self.answers.remove(&question.id) {
            Some(Answer::Choices(values)) => values,
            Some(Answer::Text(text)) if !text.is_empty() => vec![text],
            _ => Vec::new(),
        };
        if checked {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else {
            values.retain(|v| v != value);
        }
        self.answers.insert(question.id.clone(), Answer::Choices(values));
        Ok(())
    }

    /// Whether the respondent may move past the current step: optional
    /// questions always pass, required ones need a non-blank answer.
    pub fn is_step_valid(&self) -> bool {
        match self.current_question() {
            Some(question) if question.required => self
                .answers
                .get(&question.id)
                .is_some_and(|answer| !answer.is_blank()),
            _ => true,
        }
    }

    /// Advance one step. Returns `false` when already on the last question.
    pub fn next_step(&mut self) -> bool {
        if self.step + 1 < self.order.len() {
            self.step += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step. Returns `false` when already on the first question.
    pub fn prev_step(&mut self) -> bool {
        if self.step > 0 {
            self.step -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.order.len()
    }

    /// Progress through the questions, counting the current one, rounded to a
    /// whole percent. An empty questionnaire reports 0.
    pub fn progress_percent(&self) -> u8 {
        if self.order.is_empty() {
            return 0;
        }
        let percent = ((self.step + 1) * 200 + self.order.len()) / (self.order.len() * 2);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Check every answer and build the response.
    ///
    /// # Errors
    /// The first problem found, in presentation order.
    pub fn submit(&self, respondent: Option<&str>) -> Result<QuestionnaireResponse, ResponseError> {
        let respondent = respondent.map(str::trim).filter(|r| !r.is_empty());
        if respondent.is_none() && !self.questionnaire.settings.allow_anonymous {
            return Err(ResponseError::AnonymousNotAllowed);
        }
        for question in self.questions() {
            check_answer(question, self.answers.get(&question.id))?;
        }
        let response = QuestionnaireResponse {
            id: prefixed_id("response"),
            questionnaire_id: self.questionnaire.id.clone(),
            answers: self
                .answers
                .iter()
                .filter(|(_, answer)| !answer.is_blank())
                .map(|(id, answer)| (id.clone(), answer.clone()))
                .collect(),
            submitted_at: OffsetDateTime::now_utc(),
            respondent_id: respondent.map(str::to_string),
        };
        info!(
            "response '{}' submitted for '{}' with {} answers",
            response.id,
            response.questionnaire_id,
            response.answers.len()
        );
        Ok(response)
    }

    fn question(&self, question_id: &str) -> Result<&'q Question, ResponseError> {
        self.questionnaire
            .question(question_id)
            .ok_or_else(|| ResponseError::UnknownQuestion(question_id.to_string()))
    }
}

/// Check a single answer against its question's rules.
///
/// # Errors
/// `MissingAnswer` for a blank required answer, `Rejected` for an answer that
/// breaks a rule, `InvalidPattern` if the question's own pattern is broken.
pub fn check_answer(question: &Question, answer: Option<&Answer>) -> Result<(), ResponseError> {
    let Some(answer) = answer.filter(|a| !a.is_blank()) else {
        return if question.required {
            Err(ResponseError::MissingAnswer(question.id.clone()))
        } else {
            Ok(())
        };
    };

    let reject = |default: String| ResponseError::Rejected {
        question: question.id.clone(),
        message: question
            .validation
            .as_ref()
            .and_then(|rules| rules.custom_message.clone())
            .unwrap_or(default),
    };

    match (question.kind, answer) {
        (QuestionType::Checkbox, Answer::Choices(values)) => {
            for value in values {
                check_option(question, value).map_err(reject)?;
            }
            Ok(())
        },
        (QuestionType::Checkbox | QuestionType::Radio | QuestionType::Select, Answer::Text(value)) => {
            check_option(question, value).map_err(reject)
        },
        (_, Answer::Choices(_)) => Err(reject(format!("{} questions take a single answer", question.kind))),
        (QuestionType::Number | QuestionType::Rating, Answer::Text(text)) => check_number(question, text).map_err(reject),
        (QuestionType::Date, Answer::Text(text)) => {
            time::Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
                .map(|_| ())
                .map_err(|_| reject(format!("'{text}' is not a date (YYYY-MM-DD)")))
        },
        (QuestionType::Email, Answer::Text(text)) => {
            if !looks_like_email(text) {
                return Err(reject(format!("'{text}' is not an email address")));
            }
            check_text(question, text, reject)
        },
        (QuestionType::Text | QuestionType::Textarea, Answer::Text(text)) => check_text(question, text, reject),
    }
}

fn check_option(question: &Question, value: &str) -> Result<(), String> {
    if question.options().iter().any(|option| option.value == value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not one of the offered options"))
    }
}

/// Scale offered by rating questions that set no bounds of their own.
pub const RATING_SCALE: (f64, f64) = (1.0, 5.0);

fn check_number(question: &Question, text: &str) -> Result<(), String> {
    let value: f64 = text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{text}' is not a number"))?;
    let (min, max) = match question.kind {
        QuestionType::Rating => {
            if value.fract().abs() > f64::EPSILON {
                return Err(format!("{value} is not a whole rating"));
            }
            (
                Some(question.min.unwrap_or(RATING_SCALE.0)),
                Some(question.max.unwrap_or(RATING_SCALE.1)),
            )
        },
        _ => (question.min, question.max),
    };
    if let Some(min) = min
        && value < min
    {
        return Err(format!("{value} is below the minimum of {min}"));
    }
    if let Some(max) = max
        && value > max
    {
        return Err(format!("{value} is above the maximum of {max}"));
    }
    Ok(())
}

fn check_text(question: &Question, text: &str, reject: impl Fn(String) -> ResponseError) -> Result<(), ResponseError> {
    let Some(rules) = &question.validation else {
        return Ok(());
    };
    let length = text.chars().count();
    if let Some(min) = rules.min_length
        && length < min
    {
        return Err(reject(format!("answer must be at least {min} characters")));
    }
    if let Some(max) = rules.max_length
        && length > max
    {
        return Err(reject(format!("answer must be at most {max} characters")));
    }
    if let Some(pattern) = &rules.pattern {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| ResponseError::InvalidPattern {
            question: question.id.clone(),
            reason: e.to_string(),
        })?;
        if !regex.is_match(text) {
            return Err(reject(format!("answer does not match the pattern {pattern}")));
        }
    }
    Ok(())
}

fn looks_like_email(text: &str) -> bool {
    match text.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        },
        None => false,
    }
}
