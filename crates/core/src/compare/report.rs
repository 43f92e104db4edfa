use log::info;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use super::compare_model::CalculationDifference;
use crate::errors::{Result, TransportError};
use crate::results::CalculatedValue;

/// Plain-text rendering of a [`CalculationDifference`], grouped by category
/// with counts first.
pub struct ReportGenerator<'a> {
    difference: &'a CalculationDifference,
    title: String,
    include_properties: bool,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(difference: &'a CalculationDifference) -> Self {
        Self {
            difference,
            title: "Regression report".to_string(),
            include_properties: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_properties(mut self, include: bool) -> Self {
        self.include_properties = include;
        self
    }

    pub fn render(&self) -> String {
        let d = self.difference;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        let _ = writeln!(out, "Equal:                {}", d.equal_count);
        let _ = writeln!(out, "Different:            {}", d.different.len());
        let _ = writeln!(out, "Only in base:         {}", d.only_base.len());
        let _ = writeln!(out, "Only in test:         {}", d.only_test.len());
        if self.include_properties {
            let _ = writeln!(out, "Different properties: {}", d.different_properties.len());
        }

        if !d.different.is_empty() {
            let _ = writeln!(out, "\nDifferent ({}):", d.different.len());
            for (key, (base, test)) in &d.different {
                let _ = writeln!(out, "  {}", key);
                let _ = writeln!(out, "    base: {}", describe(base));
                let _ = writeln!(out, "    test: {}", describe(test));
            }
        }
        if !d.only_base.is_empty() {
            let _ = writeln!(out, "\nOnly in base ({}):", d.only_base.len());
            for (key, value) in &d.only_base {
                let _ = writeln!(out, "  {} = {}", key, describe(value));
            }
        }
        if !d.only_test.is_empty() {
            let _ = writeln!(out, "\nOnly in test ({}):", d.only_test.len());
            for (key, value) in &d.only_test {
                let _ = writeln!(out, "  {} = {}", key, describe(value));
            }
        }
        if self.include_properties && !d.different_properties.is_empty() {
            let _ = writeln!(out, "\nDifferent properties ({}):", d.different_properties.len());
            for (key, (base, test)) in &d.different_properties {
                let _ = writeln!(out, "  {}", key);
                let _ = writeln!(out, "    base: {}", base);
                let _ = writeln!(out, "    test: {}", test);
            }
        }
        out
    }

    pub fn write_to(&self, writer: &mut dyn io::Write) -> Result<()> {
        writer
            .write_all(self.render().as_bytes())
            .map_err(TransportError::Io)?;
        Ok(())
    }

    /// Writes the report to `path`, creating parent directories.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(TransportError::Io)?;
        }
        fs::write(path, self.render()).map_err(TransportError::Io)?;
        info!("Wrote regression report to {}", path.display());
        Ok(())
    }
}

fn describe(value: &CalculatedValue) -> String {
    format!(
        "{} ({:?} '{}')",
        value.value.summary(),
        value.target_type,
        value.target_name
    )
}
