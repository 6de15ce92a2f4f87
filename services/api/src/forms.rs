use clap::Args;
use intern_intake::config::AppConfig;
use intern_intake::error::AppError;
use intern_intake::forms::{ApplicantFormData, FormAssembler};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// JSON file with the applicant's answers (camelCase or legacy keys)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Registration number printed in the personal information section
    #[arg(long)]
    pub(crate) registration: Option<String>,
    /// Where to write the PDF
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Devanagari-capable TrueType font; defaults to FORM_FONT_PATH
    #[arg(long)]
    pub(crate) font: Option<PathBuf>,
}

pub(crate) fn render_form_file(args: RenderArgs) -> Result<(), AppError> {
    let font = match args.font {
        Some(font) => font,
        None => AppConfig::load()?.forms.font_path,
    };

    let raw = std::fs::read(&args.input)?;
    let applicant: ApplicantFormData = serde_json::from_slice(&raw)?;
    let assembler = FormAssembler::from_font_path(font);
    let bytes = assembler.create_application_form(&applicant, args.registration.as_deref())?;

    std::fs::write(&args.output, &bytes)?;
    println!(
        "Wrote {} ({} bytes) using font {}",
        args.output.display(),
        bytes.len(),
        assembler.font_path().display()
    );
    Ok(())
}
