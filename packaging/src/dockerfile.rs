//! Dockerfile rendering.
//!
//! The image has three stages. The application build stage and the installer stage are
//! thrown away; the final stage copies exactly two things out of them (the application
//! artifact and the probe binary), so neither the build toolchain nor the installer's
//! network client ends up in the shipped image.

use crate::{
    errors::PackagingError,
    recipe::{ImageRecipe, InstallerSource, HEALTHCHECK_BINARY_PATH, HEALTHCHECK_COMMAND},
};
use healthcheck::args::DEFAULT_TIMEOUT_MS;
use std::fmt::Write;
use tracing::debug;

pub const BUILD_STAGE: &str = "build";
pub const INSTALLER_STAGE: &str = "healthcheck-installer";
const INSTALLER_ROOT: &str = "/opt/healthcheck-installer";
const INSTALLER_OUTPUT: &str = "/out/healthcheck";

/// Renders a list of arguments in Dockerfile exec form, e.g. `["java", "-jar", "app.jar"]`.
pub fn exec_form<S: AsRef<str>>(args: &[S]) -> Result<String, PackagingError> {
    let quoted = args
        .iter()
        .map(|arg| serde_json::to_string(arg.as_ref()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PackagingError::RenderError {
            message: format!("failed to quote exec arguments: {}", e),
        })?;
    Ok(format!("[{}]", quoted.join(", ")))
}

/// Quotes a word for the `/bin/sh -c` that runs a shell-form `RUN`. Plain words are
/// left alone.
pub fn shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '.' | '_' | '-' | '/' | ':' | '=' | '@' | '+' | ',')
        });
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// The full `HEALTHCHECK` instruction of the final stage.
///
/// The probe gets the same deadline as the runtime's `--timeout`. It is only spelled
/// out when it differs from the probe's built-in default.
pub fn healthcheck_instruction(recipe: &ImageRecipe) -> Result<String, PackagingError> {
    let probe_path = recipe.probe_path()?;
    let mut args = vec![
        HEALTHCHECK_COMMAND.to_string(),
        recipe.service.port.to_string(),
        probe_path.to_string(),
    ];
    let timeout_ms = recipe.healthcheck.timeout_ms();
    if timeout_ms != DEFAULT_TIMEOUT_MS {
        args.push("--timeout-ms".to_string());
        args.push(timeout_ms.to_string());
    }
    let command = exec_form(&args)?;
    Ok(format!(
        "HEALTHCHECK {} \\\n  CMD {}",
        recipe.healthcheck.to_dockerfile_flags(),
        command
    ))
}

pub fn render(recipe: &ImageRecipe) -> Result<String, PackagingError> {
    recipe.validate()?;
    let mut out = String::new();
    render_build_stage(recipe, &mut out)?;
    out.push('\n');
    render_installer_stage(recipe, &mut out)?;
    out.push('\n');
    render_final_stage(recipe, &mut out)?;
    debug!(
        lines = out.lines().count(),
        "[Packaging] Rendered Dockerfile"
    );
    Ok(out)
}

fn render_build_stage(recipe: &ImageRecipe, out: &mut String) -> Result<(), PackagingError> {
    let build = &recipe.build;
    writeln!(out, "FROM {} AS {}", build.image, BUILD_STAGE).map_err(fmt_error)?;
    writeln!(out, "WORKDIR {}", build.workdir).map_err(fmt_error)?;
    for path in &build.copy {
        let target = format!("./{}", path.trim_start_matches("./"));
        writeln!(out, "COPY {} {}", path, target).map_err(fmt_error)?;
    }
    writeln!(out, "RUN {}", build.command).map_err(fmt_error)?;
    Ok(())
}

fn render_installer_stage(recipe: &ImageRecipe, out: &mut String) -> Result<(), PackagingError> {
    let stage = &recipe.installer;
    writeln!(out, "FROM {} AS {}", stage.image, INSTALLER_STAGE).map_err(fmt_error)?;
    match &stage.source {
        InstallerSource::Path { path } => {
            writeln!(out, "WORKDIR /src").map_err(fmt_error)?;
            writeln!(out, "COPY {} .", path).map_err(fmt_error)?;
            writeln!(
                out,
                "RUN cargo install --path installer --root {}",
                INSTALLER_ROOT
            )
            .map_err(fmt_error)?;
        },
        InstallerSource::Git { url, rev } => {
            let rev = rev
                .as_ref()
                .map(|rev| format!(" --rev {}", shell_word(rev)))
                .unwrap_or_default();
            writeln!(
                out,
                "RUN cargo install --git {}{} --root {} healthcheck-installer",
                shell_word(url),
                rev,
                INSTALLER_ROOT
            )
            .map_err(fmt_error)?;
        },
    }

    let mut install = format!(
        "RUN {}/bin/healthcheck-installer --destination {}",
        INSTALLER_ROOT, INSTALLER_OUTPUT
    );
    if let Some(release) = &stage.release {
        install.push_str(&format!(" --release {}", shell_word(release)));
    }
    if let Some(url_template) = &stage.url_template {
        install.push_str(&format!(" --url-template {}", shell_word(url_template)));
    }
    writeln!(out, "{}", install).map_err(fmt_error)?;
    Ok(())
}

fn render_final_stage(recipe: &ImageRecipe, out: &mut String) -> Result<(), PackagingError> {
    let runtime = &recipe.runtime;
    let service = &recipe.service;
    let probe_path = recipe.probe_path()?;

    writeln!(out, "FROM {}", runtime.image).map_err(fmt_error)?;
    writeln!(out, "WORKDIR {}", runtime.workdir).map_err(fmt_error)?;
    writeln!(
        out,
        "COPY --from={} {} {}",
        BUILD_STAGE, recipe.build.artifact, recipe.build.artifact_name
    )
    .map_err(fmt_error)?;
    writeln!(
        out,
        "COPY --from={} {} {}",
        INSTALLER_STAGE, INSTALLER_OUTPUT, HEALTHCHECK_BINARY_PATH
    )
    .map_err(fmt_error)?;
    out.push('\n');
    writeln!(out, "EXPOSE {}", service.port).map_err(fmt_error)?;
    writeln!(out, "ENV PORT={}", service.port).map_err(fmt_error)?;
    writeln!(out, "ENV API_PATH={}", probe_path).map_err(fmt_error)?;
    out.push('\n');
    writeln!(out, "{}", healthcheck_instruction(recipe)?).map_err(fmt_error)?;
    out.push('\n');
    writeln!(out, "CMD {}", exec_form(&runtime.command)?).map_err(fmt_error)?;
    Ok(())
}

fn fmt_error(e: std::fmt::Error) -> PackagingError {
    PackagingError::RenderError {
        message: format!("{:?}", e),
    }
}
