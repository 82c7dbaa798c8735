use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::convert::{ConvertOptions, egf_to_egfb, egf_to_svg, egfb_to_egf, svg_to_egf};
use crate::errors::FrontendError;

/// 演示用的样例 SVG，覆盖矩形、圆、线段、椭圆与多边形。
pub const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300">
  <rect x="50" y="50" width="100" height="75" fill="#ff0000" stroke="#000000"/>
  <circle cx="200" cy="150" r="40" fill="#00ff00" stroke="#000000"/>
  <line x1="300" y1="50" x2="350" y2="100" stroke="#0000ff"/>
  <ellipse cx="150" cy="200" rx="30" ry="20" fill="#ffff00" stroke="#000000"/>
  <polygon points="250,200 270,220 250,240 230,220" fill="#ff00ff" stroke="#000000"/>
</svg>"##;

#[derive(Debug, Clone)]
pub struct DemoFile {
    pub name: &'static str,
    pub description: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    pub files: Vec<DemoFile>,
}

impl DemoReport {
    fn record(&mut self, dir: &Path, name: &'static str, description: &'static str) {
        let path = dir.join(name);
        info!(path = %path.display(), "{description}");
        self.files.push(DemoFile {
            name,
            description,
            path,
        });
    }
}

/// 写出样例 SVG 并依次执行四个方向的转换，任一步失败即中止。
pub fn run_demo(dir: &Path, options: &ConvertOptions) -> Result<DemoReport, FrontendError> {
    info!(dir = %dir.display(), "运行转换演示");
    fs::create_dir_all(dir).map_err(|source| FrontendError::DemoSetup {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut report = DemoReport::default();
    let svg = dir.join("demo.svg");
    vfb_io::write_text(&svg, SAMPLE_SVG).map_err(FrontendError::DemoSample)?;
    report.record(dir, "demo.svg", "original");

    let egf = dir.join("demo.egf");
    svg_to_egf(&svg, &egf, options)?;
    report.record(dir, "demo.egf", "EGF format");

    let converted = dir.join("demo_converted.svg");
    egf_to_svg(&egf, &converted, options)?;
    report.record(dir, "demo_converted.svg", "converted back from EGF");

    let egfb = dir.join("demo.egfb");
    egf_to_egfb(&egf, &egfb)?;
    report.record(dir, "demo.egfb", "binary format");

    let decoded = dir.join("demo_decoded.egf");
    egfb_to_egf(&egfb, &decoded)?;
    report.record(dir, "demo_decoded.egf", "decoded from binary");

    Ok(report)
}
