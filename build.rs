use std::cmp::Ordering;
use std::env;
use std::process::Command;

// Instruction set capabilities the crate knows how to lower to
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    arch: &'static [&'static str],
    cfg_flag: &'static str,
    detected: bool,
    nightly_only: bool,
}

impl CpuFeature {
    // Define priority order between CPU Features (Lowest number == Highest Priority)
    fn priority(&self) -> usize {
        match self.name {
            "avx512bw" => 0,
            "avx512f" => 1,
            "avx2" => 2,
            "avx" => 3,
            "neon" => 4,
            "sse4.1" => 5,
            "sse2" => 6,
            _ => usize::MAX, // lowest priority by default
        }
    }

    // Groups all capabilities that select a lowering strategy in this crate
    fn features() -> Vec<CpuFeature> {
        const X86: &[&str] = &["x86", "x86_64"];
        const ARM: &[&str] = &["aarch64"];

        let feature = |name, arch, cfg_flag, nightly_only| CpuFeature {
            name,
            arch,
            cfg_flag,
            detected: false,
            nightly_only,
        };

        vec![
            feature("sse2", X86, "have_sse2", false),
            feature("sse3", X86, "have_sse3", false),
            feature("ssse3", X86, "have_ssse3", false),
            feature("sse4.1", X86, "have_sse4_1", false),
            feature("sse4.2", X86, "have_sse4_2", false),
            feature("avx", X86, "have_avx", false),
            feature("avx2", X86, "have_avx2", false),
            feature("fma", X86, "have_fma", false),
            feature("avx512f", X86, "have_avx512f", true),
            feature("avx512bw", X86, "have_avx512bw", true),
            feature("avx512dq", X86, "have_avx512dq", true),
            feature("avx512vl", X86, "have_avx512vl", true),
            feature("neon", ARM, "have_neon", false),
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority()
            .cmp(&other.priority())
            .then_with(|| self.name.cmp(other.name))
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Feature detection trait to make implementations more modular
trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

// Reads the feature set rustc compiles the target with. This is what decides
// which intrinsics are usable without runtime dispatch, and it follows
// `-C target-cpu` / `-C target-feature` as well as cross compilation.
struct TargetFeatureDetector {
    arch: String,
    enabled: Vec<String>,
}

impl TargetFeatureDetector {
    fn from_env() -> Self {
        let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
        let enabled = env::var("CARGO_CFG_TARGET_FEATURE")
            .unwrap_or_default()
            .split(',')
            .map(|feature| feature.trim().to_string())
            .filter(|feature| !feature.is_empty())
            .collect();

        Self { arch, enabled }
    }
}

impl CpuFeatureDetector for TargetFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        for feature in features.iter_mut() {
            feature.detected = feature.arch.contains(&self.arch.as_str())
                && self.enabled.iter().any(|enabled| enabled == feature.name);
        }
    }

    fn is_applicable(&self) -> bool {
        !self.arch.is_empty()
    }
}

// Factory that creates the appropriate detector for the current build
struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(TargetFeatureDetector::from_env())]
    }

    fn compiler_channel() -> String {
        let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
        let version_info = Command::new(rustc)
            .args(["--version", "--verbose"])
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
            .unwrap_or_default();

        if version_info.contains("nightly") {
            "nightly".to_string()
        } else {
            "stable".to_string()
        }
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        // Find the applicable detector and use it
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    fn apply(features: &mut [CpuFeature], nightly_build: bool) {
        // Sort features by priority (highest first)
        features.sort();

        for feature in features.iter() {
            println!("cargo::rustc-check-cfg=cfg({})", feature.cfg_flag);
        }

        // AVX512 intrinsics are only usable from nightly compilers that accept
        // the feature gates enabled in lib.rs, or from compilers where they
        // are already stable. Keep them off otherwise.
        let avx512_usable = nightly_build || rustc_minor_version() >= 89;

        for feature in features.iter().filter(|feature| feature.detected) {
            if feature.nightly_only && !avx512_usable {
                continue;
            }
            println!("cargo:rustc-cfg={}", feature.cfg_flag);
        }
    }
}

fn rustc_minor_version() -> u32 {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            let version = String::from_utf8_lossy(&output.stdout).into_owned();
            version
                .split_whitespace()
                .nth(1)
                .and_then(|semver| semver.split('.').nth(1))
                .and_then(|minor| minor.parse().ok())
        })
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CARGO_CFG_TARGET_FEATURE");

    // Detect rustc channel (stable, beta, nightly)
    let rustc_channel = PlatformDetector::compiler_channel();

    // Create a flag for modules that need nightly-only feature gates
    println!("cargo:rustc-cfg=rustc_channel=\"{rustc_channel}\"");

    // Disable flag warnings for build
    println!("cargo::rustc-check-cfg=cfg(rustc_channel, values(\"nightly\", \"stable\"))");

    let nightly_build = rustc_channel == "nightly";

    let mut features = CpuFeature::features();

    PlatformDetector::detect_cpu_features(&mut features);

    PlatformDetector::apply(&mut features, nightly_build);
}
