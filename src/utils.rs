use std::io::Write;
use std::path::PathBuf;

use env_logger::{fmt::Color, Builder};
use log::{Level, LevelFilter};

use crate::error::DomscanError;

pub fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            let timestamp = buf.timestamp();

            let mut red_style = buf.style();
            red_style.set_color(Color::Red).set_bold(true);
            let mut green_style = buf.style();
            green_style.set_color(Color::Green).set_bold(true);
            let mut white_style = buf.style();
            white_style.set_color(Color::White).set_bold(false);
            let mut orange_style = buf.style();
            orange_style
                .set_color(Color::Rgb(255, 102, 0))
                .set_bold(true);
            let mut apricot_style = buf.style();
            apricot_style
                .set_color(Color::Rgb(255, 195, 0))
                .set_bold(true);

            let msg = match record.level() {
                Level::Warn => (
                    orange_style.value(record.level()),
                    orange_style.value(record.args()),
                ),
                Level::Info => (
                    green_style.value(record.level()),
                    white_style.value(record.args()),
                ),
                Level::Debug => (
                    apricot_style.value(record.level()),
                    apricot_style.value(record.args()),
                ),
                Level::Error => (
                    red_style.value(record.level()),
                    red_style.value(record.args()),
                ),
                _ => (
                    white_style.value(record.level()),
                    white_style.value(record.args()),
                ),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                white_style.value(timestamp),
                msg.0,
                msg.1
            )
        })
        .filter(None, LevelFilter::Info)
        .init();
}

/// Enum to specify the type of file component to retrieve
pub enum FileComponent {
    /// The full file name including the extension
    FileName,
    /// The file name without the extension
    FileStem,
}

/// Extracts the specified file component from a path as a `String`.
pub fn get_file_component(path: &PathBuf, component: FileComponent) -> Result<String, DomscanError> {
    match component {
        FileComponent::FileName => path
            .file_name()
            .ok_or(DomscanError::FileNameConversionError)
            .and_then(|os_str| {
                os_str
                    .to_str()
                    .map(String::from)
                    .ok_or(DomscanError::FileNameConversionError)
            }),
        FileComponent::FileStem => path
            .file_stem()
            .ok_or(DomscanError::FileNameConversionError)
            .and_then(|os_str| {
                os_str
                    .to_str()
                    .map(String::from)
                    .ok_or(DomscanError::FileNameConversionError)
            }),
    }
}

/// Replaces path separators and whitespace in sequence identifiers
/// so they are safe to use as file names
pub fn sanitize_id(id: &str) -> String {
    id.replace(['/', '\\', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_components_from_path() {
        let path = PathBuf::from("/data/queries/query1.fasta");
        assert_eq!(
            get_file_component(&path, FileComponent::FileName).unwrap(),
            "query1.fasta"
        );
        assert_eq!(
            get_file_component(&path, FileComponent::FileStem).unwrap(),
            "query1"
        );
    }

    #[test]
    fn sanitized_identifiers() {
        assert_eq!(sanitize_id("tag@NC_000913.3"), "tag@NC_000913.3");
        assert_eq!(sanitize_id("a/b c"), "a_b_c");
    }
}
