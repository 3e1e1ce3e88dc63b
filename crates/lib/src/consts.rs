/// Default build script looked up in the root directory.
pub const DEFAULT_CONFIG_FILE: &str = "build.lua";

/// Default build directory name, relative to the root directory.
pub const DEFAULT_BUILD_DIR: &str = ".build";

/// Environment variable overriding the root directory.
pub const ROOT_ENV: &str = "BGRAPH_ROOT";

/// Environment variable overriding the build directory.
pub const BUILD_DIR_ENV: &str = "BGRAPH_BUILD_DIR";

/// Prefix length of truncated object hashes.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Default prefix for engine-wide preprocessor defines.
pub const DEFAULT_DEFINE_PREFIX: &str = "ION";

/// Suffix of generated texture artifacts.
pub const TEXTURE_ARTIFACT_SUFFIX: &str = ".ion.texture";

/// Suffix of generated shader artifacts.
pub const SHADER_ARTIFACT_SUFFIX: &str = ".ion.shader";

/// Directory under the build dir that holds per-project files.
pub const PROJECTS_DIR: &str = "projects";
