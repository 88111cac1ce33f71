//! Stamps the build date/time into the binary for `-v` startup logs.
//! Set LASERLINE_BUILD_DATE / LASERLINE_BUILD_TIME for reproducible builds.

use time::format_description::FormatItem;
use time::macros::format_description;

const DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]Z");

fn stamp(var: &str, format: &[FormatItem<'static>], now: time::OffsetDateTime) {
    println!("cargo:rerun-if-env-changed={var}");
    let value = std::env::var(var)
        .ok()
        .or_else(|| now.format(format).ok())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env={var}={value}");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let now = time::OffsetDateTime::now_utc();
    stamp("LASERLINE_BUILD_DATE", DATE, now);
    stamp("LASERLINE_BUILD_TIME", TIME, now);
}
