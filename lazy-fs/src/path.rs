/// 绝对路径的拆解，只认 `/` 作为分隔符
pub trait Path {
    fn is_absolute(&self) -> bool;

    /// 依次返回每一段路径，跳过空段（连续或结尾的 `/`）
    fn components(&self) -> impl Iterator<Item = &Self>;

    /// 返回路径的`(父目录, 文件名)`，根目录返回 `None`
    fn parent_file(&self) -> Option<(&Self, &Self)>;
}

impl Path for str {
    #[inline]
    fn is_absolute(&self) -> bool {
        self.starts_with('/')
    }

    fn components(&self) -> impl Iterator<Item = &Self> {
        self.split('/').filter(|s| !s.is_empty())
    }

    fn parent_file(&self) -> Option<(&Self, &Self)> {
        let trimmed = self.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        trimmed
            .rsplit_once('/')
            .map(|(p, f)| if p.is_empty() { ("/", f) } else { (p, f) })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn components() {
        assert_eq!(Vec::<&str>::new(), "/".components().collect::<Vec<_>>());
        assert_eq!(vec!["a", "b"], "/a//b/".components().collect::<Vec<_>>());
        assert_eq!(3, "/usr/lib/rust".components().count());
    }

    #[test]
    fn parent_file() {
        assert_eq!(None, "/".parent_file());
        assert_eq!(Some(("/", "a")), "/a".parent_file());
        assert_eq!(Some(("/a/b", "c")), "/a/b/c".parent_file());
        assert_eq!(Some(("/a", "b")), "/a/b/".parent_file());
        assert_eq!(None, "a".parent_file());
    }

    #[test]
    fn absolute() {
        assert!("/x".is_absolute());
        assert!(!"x/y".is_absolute());
    }
}
