//! Placeholder expansion for flag and environment templates.
//!
//! Templates are plain strings with `${...}` placeholders:
//!
//! * `${install_root}` - where the package being built will land
//! * `${libext}` - platform shared-library extension (`so`, `dylib`, `dll`)
//! * `${NAME.prefix}` / `.include` / `.lib` / `.bin` / `.share` - installed
//!   locations of a resolved dependency
//! * `${env:VAR}` - renders as a literal `$VAR` for the launcher script
//!   to expand at run time
//!
//! Expansion is pure: all inputs come from the resolved dependency set
//! and the platform, never from the process environment.

use std::path::Path;

use crate::core::catalog::ResolvedDependencySet;
use crate::core::platform::Platform;
use crate::planner::errors::PlanError;

/// Everything a template may reference.
pub struct TemplateContext<'a> {
    pub deps: &'a ResolvedDependencySet,
    pub install_root: &'a Path,
    pub platform: &'a Platform,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        deps: &'a ResolvedDependencySet,
        install_root: &'a Path,
        platform: &'a Platform,
    ) -> Self {
        TemplateContext {
            deps,
            install_root,
            platform,
        }
    }

    /// Expand every placeholder in a template.
    pub fn render(&self, template: &str) -> Result<String, PlanError> {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                return Err(PlanError::TemplateResolution {
                    placeholder: rest[start..].to_string(),
                    template: template.to_string(),
                    reason: "unterminated placeholder".to_string(),
                });
            };
            let name = &after[..end];
            output.push_str(&self.expand(name, template)?);
            rest = &after[end + 1..];
        }
        output.push_str(rest);
        Ok(output)
    }

    fn expand(&self, name: &str, template: &str) -> Result<String, PlanError> {
        if name == "install_root" {
            return Ok(self.install_root.display().to_string());
        }
        if name == "libext" {
            return Ok(self.platform.shared_lib_ext().to_string());
        }
        if let Some(var) = name.strip_prefix("env:") {
            // Late-bound: the launcher script expands it, not us.
            return Ok(format!("${}", var));
        }

        let Some((dep_name, field)) = name.split_once('.') else {
            return Err(self.unresolvable(name, template, "unknown placeholder"));
        };
        let Some(paths) = self.deps.paths(dep_name) else {
            return Err(self.unresolvable(
                name,
                template,
                format!("dependency `{}` is not in the resolved set", dep_name),
            ));
        };
        let path = match field {
            "prefix" => paths.prefix.clone(),
            "include" => paths.include_dir(),
            "lib" => paths.lib_dir(),
            "bin" => paths.bin_dir(),
            "share" => paths.share_dir(),
            other => {
                return Err(self.unresolvable(
                    name,
                    template,
                    format!("`{}` is not an install path field", other),
                ));
            }
        };
        Ok(path.display().to_string())
    }

    fn unresolvable(
        &self,
        name: &str,
        template: &str,
        reason: impl Into<String>,
    ) -> PlanError {
        PlanError::TemplateResolution {
            placeholder: format!("${{{}}}", name),
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Names of `${env:VAR}` references in a template. Used by the
/// environment composer to detect self-references.
pub fn env_references(template: &str) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${env:") {
        let after = &rest[start + 6..];
        match after.find('}') {
            Some(end) => {
                refs.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    refs
}
