//! Write the OpenAPI description to `quill-web/docs/`

use std::fs;
use std::path::Path;
use utoipa::OpenApi;
use quill_web::openapi::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let docs_dir = Path::new("quill-web/docs");
    if !docs_dir.exists() {
        fs::create_dir_all(docs_dir)?;
    }

    let openapi = ApiDoc::openapi();

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, openapi.to_pretty_json()?)?;
    println!("Generated: {}", json_path.display());

    let compact_path = docs_dir.join("openapi.compact.json");
    fs::write(&compact_path, serde_json::to_string(&openapi)?)?;
    println!("Generated: {}", compact_path.display());

    Ok(())
}
