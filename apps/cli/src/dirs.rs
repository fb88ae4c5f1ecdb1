use std::path::PathBuf;

const DATA_DIR_ENV: &str = "GGR_REPORT_DATA_DIR";
const DATA_DIR_NAME: &str = "ggr-report";
const DB_FILE_NAME: &str = "ggr-report.sqlite";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

/// `$GGR_REPORT_DATA_DIR`, else the first standard location that already
/// holds a database, else `$HOME/.local/share/ggr-report`.
pub fn resolve_data_dir() -> Result<DataDirResolution, String> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        let dir = PathBuf::from(dir);
        let matched_existing = dir.join(DB_FILE_NAME).exists();
        return Ok(DataDirResolution {
            dir,
            matched_existing,
        });
    }

    let home = PathBuf::from(std::env::var("HOME").map_err(|err| format!("resolve HOME: {err}"))?);
    let default_dir = home.join(".local").join("share").join(DATA_DIR_NAME);
    let candidates = [default_dir.clone(), home.join(format!(".{DATA_DIR_NAME}"))];
    for candidate in candidates {
        if candidate.join(DB_FILE_NAME).exists() {
            return Ok(DataDirResolution {
                dir: candidate,
                matched_existing: true,
            });
        }
    }

    Ok(DataDirResolution {
        dir: default_dir,
        matched_existing: false,
    })
}
