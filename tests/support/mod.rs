//! A stand-in for `gradlew` that updates wrapper properties and, when handed
//! an init script, re-applies the propagation inside the included build.

use recursive_wrapper_workspace::{
    Activation, Config, DependencyVerification, Error, Invocation, Launcher, LocalBuild,
    ProcessExit, ProcessRunner, RecursiveWrapper, Result, ShowStacktrace, WrapperProperties,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const VERIFICATION_METADATA: &str = "gradle/verification-metadata.xml";

#[derive(Debug, Clone)]
pub struct Call {
    pub dir: PathBuf,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct FakeGradle {
    pub calls: Mutex<Vec<Call>>,
    pub failures: Mutex<Vec<String>>,
}

impl FakeGradle {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    fn apply_init_script(&self, dir: &Path, args: &[String]) -> Result<()> {
        let script = value_of(args, "--init-script").expect("init script argument");
        assert!(
            Path::new(script).is_file(),
            "init script {script} is gone while {} runs",
            dir.display()
        );

        let build = LocalBuild::open(dir, invocation_from_args(args))?.as_included();
        let config = Config::load_for_build(dir)?;
        let wrapper = RecursiveWrapper::new(config).with_launcher(Launcher::Posix);
        match wrapper.apply(&build)?.when_ready(&build)? {
            Activation::Active(plan) => plan.execute(self).map(|_| ()),
            Activation::Inactive => Ok(()),
        }
    }
}

impl ProcessRunner for FakeGradle {
    fn run(&self, working_dir: &Path, program: &Path, args: &[String]) -> Result<ProcessExit> {
        assert_eq!(program.parent(), Some(working_dir));
        self.calls.lock().unwrap().push(Call {
            dir: working_dir.to_path_buf(),
            args: args.to_vec(),
        });

        let result = if !verification_passes(working_dir, args) {
            Err(Error::ConfigError(format!(
                "Dependency verification failed in {}",
                working_dir.display()
            )))
        } else if value_of(args, "--init-script").is_some() {
            self.apply_init_script(working_dir, args)
        } else {
            write_properties(working_dir, args);
            Ok(())
        };

        let code = match result {
            Ok(()) => 0,
            Err(e) => {
                self.failures.lock().unwrap().push(e.to_string());
                1
            }
        };
        Ok(ProcessExit { code: Some(code) })
    }
}

/// Builds with verification metadata only pass in lenient or off mode
fn verification_passes(dir: &Path, args: &[String]) -> bool {
    if !dir.join(VERIFICATION_METADATA).is_file() {
        return true;
    }
    let mode = value_of(args, "--dependency-verification")
        .map(|mode| mode.parse::<DependencyVerification>());
    matches!(
        mode,
        Some(Ok(DependencyVerification::Lenient | DependencyVerification::Off))
    )
}

pub fn value_of<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    args.iter().find_map(|arg| arg.strip_prefix(&prefix))
}

fn invocation_from_args(args: &[String]) -> Invocation {
    let mut invocation = Invocation::new(args.iter().take(1).cloned());
    invocation.wrapper.gradle_version = value_of(args, "--gradle-version").map(str::to_string);
    invocation.wrapper.distribution_type = value_of(args, "--distribution-type")
        .map(|value| value.parse().expect("distribution type"));
    invocation.wrapper.distribution_url =
        value_of(args, "--gradle-distribution-url").map(str::to_string);
    invocation.wrapper.distribution_sha256_sum =
        value_of(args, "--gradle-distribution-sha256-sum").map(str::to_string);
    invocation.wrapper.network_timeout =
        value_of(args, "--network-timeout").map(|value| value.parse().expect("timeout"));
    invocation.dependency_verification = value_of(args, "--dependency-verification")
        .map(|mode| mode.parse().expect("dependency verification mode"));
    if args.iter().any(|arg| arg == "--stacktrace") {
        invocation.show_stacktrace = ShowStacktrace::Always;
    }
    args.iter()
        .filter_map(|arg| arg.strip_prefix("-D"))
        .fold(invocation, |invocation, definition| {
            invocation.with_system_property(definition)
        })
}

/// What the wrapper task does to the properties file
fn write_properties(dir: &Path, args: &[String]) {
    let url = match value_of(args, "--gradle-distribution-url") {
        Some(url) => url.to_string(),
        None => format!(
            "https://services.gradle.org/distributions/gradle-{}-{}.zip",
            value_of(args, "--gradle-version").expect("gradle version"),
            value_of(args, "--distribution-type").expect("distribution type"),
        ),
    };
    let mut contents = format!("distributionUrl={}\n", url.replace(':', "\\:"));
    if let Some(sum) = value_of(args, "--gradle-distribution-sha256-sum") {
        contents.push_str(&format!("distributionSha256Sum={sum}\n"));
    }
    if let Some(timeout) = value_of(args, "--network-timeout") {
        contents.push_str(&format!("networkTimeout={timeout}\n"));
    }
    let path = dir.join("gradle/wrapper/gradle-wrapper.properties");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn read_properties(dir: &Path) -> WrapperProperties {
    WrapperProperties::load(&dir.join("gradle/wrapper/gradle-wrapper.properties")).unwrap()
}

/// Wrapper files of a build at `version`, with a launcher that is never executed
pub fn write_wrapper(dir: &Path, version: &str) {
    fs::create_dir_all(dir.join("gradle/wrapper")).unwrap();
    fs::write(dir.join("gradlew"), "#!/bin/sh\n").unwrap();
    fs::write(dir.join("gradlew.bat"), "@rem\r\n").unwrap();
    fs::write(dir.join("gradle/wrapper/gradle-wrapper.jar"), "jar").unwrap();
    fs::write(
        dir.join("gradle/wrapper/gradle-wrapper.properties"),
        format!("distributionUrl=https\\://services.gradle.org/distributions/gradle-{version}-bin.zip\n"),
    )
    .unwrap();
}

/// Verification metadata that makes strict dependency verification fail
pub fn write_verification_metadata(dir: &Path) {
    fs::create_dir_all(dir.join("gradle")).unwrap();
    fs::write(dir.join(VERIFICATION_METADATA), "<verification-metadata/>\n").unwrap();
}

/// Settings script including `includes`, creating each included directory
pub fn write_settings(dir: &Path, includes: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    let mut settings = String::new();
    for include in includes {
        fs::create_dir_all(dir.join(include)).unwrap();
        settings.push_str(&format!("includeBuild(\"{include}\")\n"));
    }
    fs::write(dir.join("settings.gradle.kts"), settings).unwrap();
}
