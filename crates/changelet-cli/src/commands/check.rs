//! `changelet check` command implementation.
//!
//! Loads the configured artifacts and cross-checks them:
//! - catalogue ids are unique and dependencies name known services
//! - mapping entries refer to catalogue services and carry usable paths
//! - the default role exists in the permission matrix

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use changelet_core::ChangeletConfig;
use changelet_runtime::Pipeline;

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning - may indicate a potential issue.
    Warning,
    /// Error - configuration is invalid.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Category of the check that produced this finding.
    pub category: String,
    pub message: String,
    /// Document the finding refers to.
    pub file: Option<PathBuf>,
    /// Location within the document (e.g. "mappings.payment.timeout").
    pub location: Option<String>,
}

impl CheckFinding {
    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            file: None,
            location: None,
        }
    }

    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    fn with_file(mut self, file: Option<&Path>) -> Self {
        self.file = file.map(Path::to_path_buf);
        self
    }

    fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Print human-readable summary. Info findings are shown only when nothing
    /// else was found.
    pub fn print_summary(&self) {
        let errors = self.count(Severity::Error);
        let warnings = self.count(Severity::Warning);

        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            if severity == Severity::Info && errors + warnings > 0 {
                continue;
            }
            let mut group: Vec<_> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| a.category.cmp(&b.category));

            println!("\n{} ({}):", severity, group.len());
            println!("{}", "-".repeat(60));
            for finding in group {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "=".repeat(60));
        if errors == 0 && warnings == 0 {
            println!("✔ All checks passed!");
        } else {
            println!("Summary: {} error(s), {} warning(s)", errors, warnings);
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let location = match (&finding.file, &finding.location) {
        (Some(f), Some(l)) => format!(" [{}:{}]", f.display(), l),
        (Some(f), None) => format!(" [{}]", f.display()),
        (None, Some(l)) => format!(" [{}]", l),
        (None, None) => String::new(),
    };

    println!("  [{}]{}: {}", finding.category, location, finding.message);
}

// ============================================================================
// Main Check Runner
// ============================================================================

/// Run all configuration checks.
pub fn run(config_path: &Path) -> Result<()> {
    println!("Checking Changelet configuration: {}", config_path.display());

    let config = ChangeletConfig::load_with_context(config_path)
        .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;
    let pipeline = Pipeline::from_config(&config).context("Failed to load pipeline artifacts")?;

    let results = collect(
        &pipeline,
        Some(config.catalogue.as_path()),
        Some(config.mapping.as_path()),
    );
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "Configuration check failed with {} error(s)",
            results.count(Severity::Error)
        );
    }
    Ok(())
}

/// Run every cross-check against a loaded pipeline.
pub fn collect(
    pipeline: &Pipeline,
    catalogue_file: Option<&Path>,
    mapping_file: Option<&Path>,
) -> CheckResults {
    let mut results = CheckResults::default();
    results.extend(check_catalogue(pipeline, catalogue_file));
    results.extend(check_mapping(pipeline, mapping_file));
    results.extend(check_policy(pipeline));
    results
}

// ============================================================================
// Check 1: Catalogue
// ============================================================================

fn check_catalogue(pipeline: &Pipeline, file: Option<&Path>) -> Vec<CheckFinding> {
    let mut findings = Vec::new();
    let catalogue = pipeline.catalogue();
    let mut seen = HashSet::new();

    for (idx, service) in catalogue.services.iter().enumerate() {
        let location = format!("services[{}]", idx);

        if service.id.is_empty() {
            findings.push(
                CheckFinding::error("catalogue", "Service with empty id")
                    .with_file(file)
                    .with_location(location.clone()),
            );
        } else if !seen.insert(service.id.as_str()) {
            findings.push(
                CheckFinding::error(
                    "catalogue",
                    format!("Duplicate service id '{}'", service.id),
                )
                .with_file(file)
                .with_location(location.clone()),
            );
        }

        for dep in &service.dependencies {
            if dep == &service.id {
                findings.push(
                    CheckFinding::warning(
                        "catalogue",
                        format!("Service '{}' depends on itself", service.id),
                    )
                    .with_file(file)
                    .with_location(format!("{}.dependencies", location)),
                );
            } else if !catalogue.contains(dep) {
                findings.push(
                    CheckFinding::error(
                        "catalogue",
                        format!(
                            "Service '{}' depends on unknown service '{}'",
                            service.id, dep
                        ),
                    )
                    .with_file(file)
                    .with_location(format!("{}.dependencies", location)),
                );
            }
        }
    }

    findings
}

// ============================================================================
// Check 2: Mapping table
// ============================================================================

fn check_mapping(pipeline: &Pipeline, file: Option<&Path>) -> Vec<CheckFinding> {
    let mut findings = Vec::new();
    let catalogue = pipeline.catalogue();
    let mapping = pipeline.mapping();

    for service in mapping.mappings.keys() {
        if !catalogue.contains(service) {
            findings.push(
                CheckFinding::error(
                    "mapping",
                    format!("Mapping refers to unknown service '{}'", service),
                )
                .with_file(file)
                .with_location(format!("mappings.{}", service)),
            );
        }
    }

    for (service, key, path) in mapping.entries() {
        let location = format!("mappings.{}.{}", service, key);
        if path.is_empty() {
            findings.push(
                CheckFinding::warning(
                    "mapping",
                    format!(
                        "Empty path for '{}.{}'; values fall back to '{}.{}'",
                        service, key, service, key
                    ),
                )
                .with_file(file)
                .with_location(location),
            );
        } else if path.split('.').any(str::is_empty) {
            findings.push(
                CheckFinding::warning(
                    "mapping",
                    format!("Path '{}' contains an empty segment", path),
                )
                .with_file(file)
                .with_location(location),
            );
        }
    }

    for service in &catalogue.services {
        if !mapping.mappings.contains_key(&service.id) {
            findings.push(CheckFinding::info(
                "mapping",
                format!(
                    "No mapping entries for '{}'; all keys use '{}.<key>'",
                    service.id, service.id
                ),
            ));
        }
    }

    findings
}

// ============================================================================
// Check 3: Policy tables
// ============================================================================

fn check_policy(pipeline: &Pipeline) -> Vec<CheckFinding> {
    let policy = pipeline.policy();
    let mut findings = Vec::new();

    if !policy.role_permissions.contains_key(&policy.default_role) {
        findings.push(
            CheckFinding::warning(
                "policy",
                format!(
                    "Default role '{}' has no permissions; changesets without a role are always rejected",
                    policy.default_role
                ),
            )
            .with_location("policy.default_role"),
        );
    }

    findings
}
