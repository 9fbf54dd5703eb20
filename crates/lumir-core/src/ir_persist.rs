use crate::pipeline::Pipeline;
use std::fs;
use std::io;
use std::path::Path;

pub fn save_pipeline(pipeline: &Pipeline, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(pipeline)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)?;
    Ok(())
}

pub fn load_pipeline(path: impl AsRef<Path>) -> io::Result<Pipeline> {
    let json = fs::read_to_string(path)?;
    parse_pipeline(&json)
}

pub fn parse_pipeline(json: &str) -> io::Result<Pipeline> {
    serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Expr, LoopVar, Stmt, ValType};
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_load_pipeline() {
        let x = Expr::var("x", ValType::Int(32));
        let body = Stmt::for_loop(
            LoopVar::new("x", Expr::IntImm(0), Expr::IntImm(4)),
            Stmt::store(Expr::load(ValType::Float(32), 1, x.clone()), 0, x),
        );
        let pipeline = Pipeline::new("copy", body);
        let temp_file = NamedTempFile::new().unwrap();

        save_pipeline(&pipeline, temp_file.path()).unwrap();

        let loaded = load_pipeline(temp_file.path()).unwrap();
        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn test_malformed_json_is_invalid_data() {
        let err = parse_pipeline("{\"name\": \"p\"}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
