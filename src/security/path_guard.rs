use crate::types::FlowError;
use std::path::{Path, PathBuf};

/// 把用户提供的文件路径限制在唯一的安全目录内
#[derive(Debug, Clone)]
pub struct PathGuard {
    safe_dir: PathBuf,
}

impl PathGuard {
    /// 相对路径基于当前工作目录转为绝对路径
    pub fn new(safe_dir: impl AsRef<Path>) -> Result<Self, FlowError> {
        let safe_dir = safe_dir.as_ref();
        let safe_dir = if safe_dir.is_absolute() {
            safe_dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(safe_dir)
        };
        Ok(Self { safe_dir })
    }

    pub fn safe_dir(&self) -> &Path {
        &self.safe_dir
    }

    /// 只保留文件名部分并拼接到安全目录下
    pub fn resolve(&self, user_path: &str) -> Result<PathBuf, FlowError> {
        let file_name = user_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains('\0')
        {
            return Err(FlowError::PathRejected(user_path.to_string()));
        }

        let resolved = self.safe_dir.join(file_name);

        // 二次确认最终路径仍在安全目录内
        if resolved.parent() != Some(self.safe_dir.as_path()) || !resolved.starts_with(&self.safe_dir) {
            return Err(FlowError::PathRejected(user_path.to_string()));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_flattened_to_basename() {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        for input in [
            "../../../etc/passwd",
            "/etc/passwd",
            "passwd",
            "a/b/c/../../passwd",
            "..\\..\\windows\\passwd",
        ] {
            assert_eq!(guard.resolve(input).unwrap(), dir.path().join("passwd"), "{}", input);
        }
    }

    #[test]
    fn rejects_empty_and_dot_names() {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        for input in ["", "..", "logs/..", "logs/", ".", "/"] {
            assert!(guard.resolve(input).is_err(), "{:?}", input);
        }
    }

    #[test]
    fn relative_safe_dir_becomes_absolute() {
        let guard = PathGuard::new("flow_logs").unwrap();
        assert!(guard.safe_dir().is_absolute());
        assert!(guard.resolve("out.txt").unwrap().starts_with(guard.safe_dir()));
    }
}
