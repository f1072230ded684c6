use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

// Function names below this crate are abbreviated with `STD_MARKER`,
// unless a configured prefix matched first.
const STD_MARKER: &str = "<std>";

fn std_prefix() -> &'static str {
    let path = module_path!();
    path.split("::").next().unwrap_or(path)
}

/// The source location of a log call, as captured by the logging macros.
///
/// Use [`origin!`](crate::origin) to create it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    file: &'static str,
    line: u32,
    column: u32,
    function: &'static str,
}
impl Origin {
    #[doc(hidden)]
    #[must_use]
    pub const fn new(file: &'static str, line: u32, column: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            column,
            function,
        }
    }

    /// The source file, as given by `file!()`.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// The line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The fully qualified name of the enclosing function.
    #[must_use]
    pub fn function(&self) -> &'static str {
        self.function
    }

    fn key(&self) -> SiteKey {
        (self.file, self.line, self.column)
    }
}

type SiteKey = (&'static str, u32, u32);

/// The rendered form of a call site, `[file:line@qualified_name]`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CallSite {
    rendered: Box<[u8]>,
    fatal_payload: String,
}
impl CallSite {
    fn new(origin: &Origin, package_prefix: Option<&str>) -> Self {
        let file = Path::new(origin.file)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(origin.file);
        let name = abbreviate(origin.function, package_prefix);
        let location = format!("{file}:{line}@{name}", line = origin.line);
        Self {
            rendered: format!("[{location}]").into_bytes().into_boxed_slice(),
            fatal_payload: format!("kvlog: fatal! at {location}"),
        }
    }

    pub(crate) fn rendered(&self) -> &[u8] {
        &self.rendered
    }

    pub(crate) fn fatal_payload(&self) -> &str {
        &self.fatal_payload
    }
}

fn abbreviate(function: &str, package_prefix: Option<&str>) -> String {
    if let Some(rest) = package_prefix.and_then(|prefix| function.strip_prefix(prefix)) {
        return rest.to_string();
    }
    match function.strip_prefix(std_prefix()) {
        Some(rest) if rest.is_empty() || rest.starts_with("::") => format!("{STD_MARKER}{rest}"),
        _ => function.to_string(),
    }
}

/// Normalizes a configured package prefix.
///
/// `app::server::http` strips `app::server::`, a plain crate name like `app` strips `app::`.
pub(crate) fn normalize_prefix(prefix: &str) -> Option<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        None
    } else if let Some(idx) = prefix.rfind("::") {
        Some(prefix[..idx + 2].to_string())
    } else {
        Some(format!("{prefix}::"))
    }
}

// Renders each call site only once and keeps the result for the lifetime of the logger.
#[derive(Debug, Default)]
pub(crate) struct CallSiteCache {
    package_prefix: Option<String>,
    sites: RwLock<HashMap<SiteKey, Arc<CallSite>>>,
}
impl CallSiteCache {
    pub(crate) fn new(package_prefix: Option<String>) -> Self {
        Self {
            package_prefix,
            sites: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn resolve(&self, origin: &Origin) -> Arc<CallSite> {
        let key = origin.key();
        if let Some(site) = self.sites.read().ok().and_then(|s| s.get(&key).cloned()) {
            return site;
        }

        // concurrent first calls may render twice, but only the first result is stored
        let site = Arc::new(CallSite::new(origin, self.package_prefix.as_deref()));
        match self.sites.write() {
            Ok(mut sites) => Arc::clone(sites.entry(key).or_insert(site)),
            Err(_) => site,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sites.read().map(|s| s.len()).unwrap_or(0)
    }
}
