// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client (customer) directory entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Service notes recorded against a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteOption {
    Corte,
    Alisado,
    Lavado,
    Planchado,
    Otros,
}

impl NoteOption {
    pub const ALL: [NoteOption; 5] = [
        NoteOption::Corte,
        NoteOption::Alisado,
        NoteOption::Lavado,
        NoteOption::Planchado,
        NoteOption::Otros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteOption::Corte => "corte",
            NoteOption::Alisado => "alisado",
            NoteOption::Lavado => "lavado",
            NoteOption::Planchado => "planchado",
            NoteOption::Otros => "otros",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NoteOption::Corte => "Corte",
            NoteOption::Alisado => "Alisado",
            NoteOption::Lavado => "Lavado",
            NoteOption::Planchado => "Planchado",
            NoteOption::Otros => "Otros",
        }
    }

    pub fn parse(value: &str) -> Option<NoteOption> {
        let normalized = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|o| o.as_str() == normalized)
    }

    /// Parse a list of stored values, dropping unknown ones and duplicates.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<NoteOption> {
        let mut out = Vec::new();
        for option in values.into_iter().filter_map(Self::parse) {
            if !out.contains(&option) {
                out.push(option);
            }
        }
        out
    }

    /// Parse legacy free-text notes.
    ///
    /// Splits on `,`, `;` and newlines first. If no piece is an exact
    /// option, falls back to any option whose name appears in the text.
    pub fn from_text(text: &str) -> Vec<NoteOption> {
        let matches = Self::from_values(text.split([',', ';', '\n']));
        if !matches.is_empty() {
            return matches;
        }

        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|o| lower.contains(o.as_str()))
            .collect()
    }
}

/// Notes as text, for search.
pub fn notes_search_text(notes: &[NoteOption]) -> String {
    notes
        .iter()
        .map(NoteOption::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A client of the shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Staff member the client usually sees
    pub main_barber_id: String,
    pub notes: Vec<NoteOption>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating a client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(default)]
    pub main_barber_id: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteOption>,
}

impl NewClient {
    /// Trim text fields; a blank phone becomes `None`.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.phone = non_blank(self.phone);
        self.main_barber_id = non_blank(self.main_barber_id);
        self.notes = dedup_notes(self.notes);
        self
    }
}

/// Full replacement of a client's editable fields.
///
/// A missing or blank phone removes the stored phone.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteOption>,
}

impl ClientUpdate {
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.phone = non_blank(self.phone);
        self.notes = dedup_notes(self.notes);
        self
    }
}

fn dedup_notes(notes: Vec<NoteOption>) -> Vec<NoteOption> {
    let mut out = Vec::with_capacity(notes.len());
    for note in notes {
        if !out.contains(&note) {
            out.push(note);
        }
    }
    out
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_dedups_and_drops_unknown() {
        let notes = NoteOption::from_values(["Corte", "lavado", "corte", "tinte"]);
        assert_eq!(notes, vec![NoteOption::Corte, NoteOption::Lavado]);
    }

    #[test]
    fn test_from_text_splits() {
        let notes = NoteOption::from_text("alisado; corte\nplanchado");
        assert_eq!(
            notes,
            vec![NoteOption::Alisado, NoteOption::Corte, NoteOption::Planchado]
        );
    }

    #[test]
    fn test_from_text_falls_back_to_substring() {
        let notes = NoteOption::from_text("Fade bajo, corte con navaja y lavado");
        assert_eq!(notes, vec![NoteOption::Corte, NoteOption::Lavado]);
        assert!(NoteOption::from_text("Usa pomada mate").is_empty());
    }

    #[test]
    fn test_new_client_normalized() {
        let input = NewClient {
            full_name: "  Leo Suarez ".to_string(),
            phone: Some("   ".to_string()),
            main_barber_id: None,
            notes: vec![],
        }
        .normalized();
        assert_eq!(input.full_name, "Leo Suarez");
        assert_eq!(input.phone, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let input = ClientUpdate {
            full_name: "   ".to_string(),
            phone: None,
            notes: vec![],
        }
        .normalized();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_notes_search_text() {
        assert_eq!(
            notes_search_text(&[NoteOption::Corte, NoteOption::Otros]),
            "corte otros"
        );
    }
}
