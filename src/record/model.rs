use crate::foundation::error::{LabrecError, LabrecResult};

/// Suffix appended to the register number to name the produced document.
pub const OUTPUT_SUFFIX: &str = "_Lab_Record.docx";

/// One student's lab record: the full input of a document build.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabRecord {
    pub course_title: String,
    pub student_name: String,
    pub register_number: String, // used verbatim in the output file name
    pub experiments: Vec<Experiment>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Experiment {
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(alias = "github")]
    pub reference_url: String,
}

impl LabRecord {
    /// Reject records the assembler must never see.
    ///
    /// Reference URLs are only required to be non-empty; anything else is encoded verbatim.
    pub fn validate(&self) -> LabrecResult<()> {
        if self.course_title.trim().is_empty() {
            return Err(LabrecError::validation("course_title must be non-empty"));
        }
        if self.student_name.trim().is_empty() {
            return Err(LabrecError::validation("student_name must be non-empty"));
        }
        validate_register_number(&self.register_number)?;

        for (idx, exp) in self.experiments.iter().enumerate() {
            if exp.reference_url.trim().is_empty() {
                return Err(LabrecError::validation(format!(
                    "experiment {} ('{}') has an empty reference_url",
                    idx + 1,
                    exp.title
                )));
            }
        }

        Ok(())
    }

    /// `<register_number>_Lab_Record.docx`
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.register_number, OUTPUT_SUFFIX)
    }
}

fn validate_register_number(reg: &str) -> LabrecResult<()> {
    if reg.trim().is_empty() {
        return Err(LabrecError::validation("register_number must be non-empty"));
    }
    if reg == "." || reg == ".." {
        return Err(LabrecError::validation(format!(
            "register_number '{reg}' is not a valid file name component"
        )));
    }
    // Also lands inside a quoted `Content-Disposition` filename.
    if let Some(bad) = reg
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '"') || c.is_control())
    {
        return Err(LabrecError::validation(format!(
            "register_number must not contain {bad:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/record/model.rs"]
mod tests;
