use itertools::Itertools;
use log::warn;
use thiserror::Error;

use crate::settings::{parse_names, Settings};

pub const CHECKBOXES: [&str; 3] = ["comma", "growth", "reverse"];
pub const NUMBERS: [&str; 3] = ["from", "to", "timeout"];
pub const NAMES: &str = "names";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing form control `{0}`")]
    MissingControl(String),
    #[error("`{value}` is not a number ({control})")]
    InvalidNumber { control: String, value: String },
}

/// The editing surface for settings, whatever draws it.
pub trait SettingsControls {
    fn read_settings(&self) -> Result<Settings, FormError>;
    /// Fill the controls from `settings`. Missing controls are skipped.
    fn write_settings(&mut self, settings: &Settings);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Checkbox(bool),
    Number(String),
    Text(String),
}

/// Named form controls in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    controls: Vec<(String, Control)>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        let mut form = Self {
            controls: CHECKBOXES
                .iter()
                .map(|name| (name.to_string(), Control::Checkbox(false)))
                .chain(
                    NUMBERS
                        .iter()
                        .map(|name| (name.to_string(), Control::Number(String::new()))),
                )
                .chain(std::iter::once((
                    NAMES.to_string(),
                    Control::Text(String::new()),
                )))
                .collect(),
        };
        form.write_settings(&Settings::default());
        form
    }
}

impl SettingsForm {
    /// A form holding only the given controls
    pub fn with_controls(controls: Vec<(String, Control)>) -> Self {
        Self { controls }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.controls.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.controls
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn control_at_mut(&mut self, idx: usize) -> Option<&mut Control> {
        self.controls.get_mut(idx).map(|(_, c)| c)
    }

    fn checked(&self, name: &str) -> Result<bool, FormError> {
        match self.get(name) {
            Some(Control::Checkbox(checked)) => Ok(*checked),
            _ => Err(FormError::MissingControl(name.to_string())),
        }
    }

    fn number(&self, name: &str) -> Result<f64, FormError> {
        let raw = match self.get(name) {
            Some(Control::Number(raw)) | Some(Control::Text(raw)) => raw,
            _ => return Err(FormError::MissingControl(name.to_string())),
        };
        raw.trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| FormError::InvalidNumber {
                control: name.to_string(),
                value: raw.clone(),
            })
    }

    fn set(&mut self, name: &str, value: Control) {
        match self.get_mut(name) {
            Some(control) if std::mem::discriminant(control) == std::mem::discriminant(&value) => {
                *control = value;
            }
            Some(control) => warn!("form control `{name}` is {control:?}, not {value:?}; skipping"),
            None => warn!("no form control `{name}`; skipping"),
        }
    }
}

impl SettingsControls for SettingsForm {
    fn read_settings(&self) -> Result<Settings, FormError> {
        let names = match self.get(NAMES) {
            Some(Control::Text(text)) => parse_names(text),
            _ => return Err(FormError::MissingControl(NAMES.to_string())),
        };

        Ok(Settings {
            comma: self.checked("comma")?,
            growth: self.checked("growth")?,
            reverse: self.checked("reverse")?,
            from: self.number("from")?,
            to: self.number("to")?,
            timeout: self.number("timeout")?,
            names,
        })
    }

    fn write_settings(&mut self, settings: &Settings) {
        self.set("comma", Control::Checkbox(settings.comma));
        self.set("growth", Control::Checkbox(settings.growth));
        self.set("reverse", Control::Checkbox(settings.reverse));
        self.set("from", Control::Number(settings.from.to_string()));
        self.set("to", Control::Number(settings.to.to_string()));
        self.set("timeout", Control::Number(settings.timeout.to_string()));
        self.set(
            NAMES,
            Control::Text(settings.names.iter().map(|p| p.name.as_str()).join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Participant;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_form_reads_default_settings() {
        let form = SettingsForm::default();
        assert_eq!(form.len(), 7);
        assert_eq!(form.read_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_write_then_read() {
        let settings = Settings {
            comma: true,
            growth: false,
            reverse: true,
            from: -5.0,
            to: 12.5,
            timeout: 3.0,
            names: vec![Participant::new("arve"), Participant::new("knut")],
        };
        let mut form = SettingsForm::default();
        form.write_settings(&settings);

        assert_eq!(form.get(NAMES), Some(&Control::Text("arve, knut".into())));
        assert_eq!(form.read_settings().unwrap(), settings);
    }

    #[test]
    fn test_read_resets_counts() {
        let mut settings = Settings {
            names: vec![Participant::new("arve")],
            ..Settings::default()
        };
        settings.names[0].count = 9;
        let mut form = SettingsForm::default();
        form.write_settings(&settings);

        assert_eq!(form.read_settings().unwrap().names[0].count, 0);
    }

    #[test]
    fn test_read_names_split_on_newlines() {
        let mut form = SettingsForm::default();
        *form.get_mut(NAMES).unwrap() = Control::Text("arve\n knut ,\n\n".into());
        let names = form.read_settings().unwrap().names;
        assert_eq!(names, vec![Participant::new("arve"), Participant::new("knut")]);
    }

    #[test]
    fn test_decimal_comma_is_accepted() {
        let mut form = SettingsForm::default();
        *form.get_mut("timeout").unwrap() = Control::Number("2,5".into());
        assert_eq!(form.read_settings().unwrap().timeout, 2.5);
    }

    #[test]
    fn test_invalid_number() {
        let mut form = SettingsForm::default();
        *form.get_mut("from").unwrap() = Control::Number("ti".into());
        assert_matches!(
            form.read_settings(),
            Err(FormError::InvalidNumber { control, value }) if control == "from" && value == "ti"
        );

        *form.get_mut("from").unwrap() = Control::Number("NaN".into());
        assert_matches!(form.read_settings(), Err(FormError::InvalidNumber { .. }));
    }

    #[test]
    fn test_read_missing_control() {
        let form = SettingsForm::with_controls(vec![("comma".into(), Control::Checkbox(true))]);
        assert_matches!(form.read_settings(), Err(FormError::MissingControl(name)) if name == NAMES);
    }

    #[test]
    fn test_write_skips_missing_and_mismatched_controls() {
        let mut form = SettingsForm::with_controls(vec![
            ("growth".into(), Control::Number("7".into())),
            ("to".into(), Control::Number("1".into())),
        ]);
        let settings = Settings {
            growth: true,
            to: 50.0,
            ..Settings::default()
        };
        form.write_settings(&settings);

        assert_eq!(form.get("growth"), Some(&Control::Number("7".into())));
        assert_eq!(form.get("to"), Some(&Control::Number("50".into())));
        assert_eq!(form.get("comma"), None);
    }
}
