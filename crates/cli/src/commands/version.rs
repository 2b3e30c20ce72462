use crate::OutputFormat;

pub fn run(format: OutputFormat) -> anyhow::Result<()> {
    let info = unimail::version_info();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("unimail {info}");
        }
    }
    Ok(())
}
