//! Template engine: loader, compiled-template cache, function registry and
//! executor behind one reader/writer lock.
//!
//! # Locking
//!
//! - `load` (cache lookup) and `render` take the lock shared
//! - `add_func`, `add_funcs` and cache inserts take it exclusively
//! - source reads and compilation happen outside the lock; two concurrent
//!   misses for the same path may both compile, and the first insert wins
//!
//! In development mode nothing is cached: every `load` re-reads and
//! re-compiles.

use crate::domain::error::{LoadError, RenderCause, RenderError};
use crate::domain::registry::{FuncResult, FunctionRegistry, TemplateFn};
use crate::domain::template::{CompiledTemplate, TemplateSource};
use crate::domain::template_eval;
use crate::domain::template_parser::compile;
use crate::ports::config_port::ConfigPort;
use crate::ports::source_port::SourcePort;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

pub const DEFAULT_TEMPLATE_DIR: &str = "./templates";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub template_dir: PathBuf,
    pub development_mode: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            development_mode: false,
        }
    }
}

impl EngineOptions {
    /// Read `[engine] template_dir` and `[engine] development_mode`, falling
    /// back to the defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        Self {
            template_dir: config
                .get_string("engine", "template_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            development_mode: config.get_bool(
                "engine",
                "development_mode",
                defaults.development_mode,
            ),
        }
    }
}

struct EngineState {
    cache: HashMap<String, Arc<CompiledTemplate>>,
    funcs: FunctionRegistry,
}

pub struct Engine {
    source: Box<dyn SourcePort + Send + Sync>,
    development_mode: bool,
    state: RwLock<EngineState>,
}

impl Engine {
    /// An engine with the built-in function library registered.
    pub fn new(source: impl SourcePort + Send + Sync + 'static, development_mode: bool) -> Self {
        Self::with_registry(source, development_mode, FunctionRegistry::with_builtins())
    }

    pub fn with_registry(
        source: impl SourcePort + Send + Sync + 'static,
        development_mode: bool,
        funcs: FunctionRegistry,
    ) -> Self {
        debug!(%development_mode, funcs = funcs.len(), "Engine::new");
        Self {
            source: Box::new(source),
            development_mode,
            state: RwLock::new(EngineState {
                cache: HashMap::new(),
                funcs,
            }),
        }
    }

    pub fn development_mode(&self) -> bool {
        self.development_mode
    }

    // Cache entries are insert-only and the registry is replaced binding by
    // binding, so a panic while holding the lock leaves nothing half-written.
    fn read_state(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_and_compile(&self, path: &str) -> Result<CompiledTemplate, LoadError> {
        let source = self.source.read(path)?;
        debug!(%path, digest = %source.hash, "Engine: compiling");
        compile(&source)
    }

    /// Return the compiled template for `path`, compiling it on a cache miss.
    pub fn load(&self, path: &str) -> Result<Arc<CompiledTemplate>, LoadError> {
        if self.development_mode {
            debug!(%path, "Engine::load: development mode, bypassing cache");
            return self.read_and_compile(path).map(Arc::new);
        }

        if let Some(hit) = self.read_state().cache.get(path) {
            debug!(%path, "Engine::load: cache hit");
            return Ok(Arc::clone(hit));
        }

        debug!(%path, "Engine::load: cache miss");
        let compiled = Arc::new(self.read_and_compile(path)?);
        let mut state = self.write_state();
        let entry = state.cache.entry(path.to_string()).or_insert(compiled);
        Ok(Arc::clone(entry))
    }

    /// Re-read and re-compile `path`, replacing any cached entry wholesale.
    /// On failure the previous entry stays in place.
    pub fn reload(&self, path: &str) -> Result<Arc<CompiledTemplate>, LoadError> {
        let compiled = Arc::new(self.read_and_compile(path)?);
        if !self.development_mode {
            debug!(%path, "Engine::reload: replacing cache entry");
            self.write_state()
                .cache
                .insert(path.to_string(), Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    /// Compile ad-hoc text without touching the source or the cache.
    pub fn compile_str(&self, name: &str, text: &str) -> Result<CompiledTemplate, LoadError> {
        compile(&TemplateSource::new(name, text.as_bytes().to_vec()))
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.read_state().cache.contains_key(path)
    }

    pub fn cached_len(&self) -> usize {
        self.read_state().cache.len()
    }

    /// Execute `template` against `context` with the registry as it is now.
    pub fn render(&self, template: &CompiledTemplate, context: &Value) -> Result<String, RenderError> {
        let state = self.read_state();
        template_eval::render(template, &state.funcs, context)
    }

    /// Serialize `data` to a context value, then render.
    pub fn render_data<T: Serialize + ?Sized>(
        &self,
        template: &CompiledTemplate,
        data: &T,
    ) -> Result<String, RenderError> {
        let context = serde_json::to_value(data).map_err(|e| RenderError {
            path: template.path.clone(),
            cause: RenderCause::Context(e.to_string()),
        })?;
        self.render(template, &context)
    }

    /// Insert or replace a function binding; later renders see it.
    pub fn add_func<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> FuncResult + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(%name, "Engine::add_func");
        self.write_state().funcs.add_func(name, f);
    }

    pub fn add_funcs<I>(&self, funcs: I)
    where
        I: IntoIterator<Item = (String, TemplateFn)>,
    {
        self.write_state().funcs.add_funcs(funcs);
    }

    pub fn has_func(&self, name: &str) -> bool {
        self.read_state().funcs.contains(name)
    }
}
