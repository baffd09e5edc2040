use std::fmt;

/// 安装器优先级，数值越小越先执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u32);

impl Priority {
    pub const HIGHEST: Priority = Priority(0);
    /// 未声明优先级时使用
    pub const LOWEST: Priority = Priority(u32::MAX);
    /// 启动流程的中间位置
    pub const MIDPOINT: Priority = Priority(u32::MAX / 2);

    pub const fn new(level: u32) -> Self {
        Priority(level)
    }

    pub const fn level(self) -> u32 {
        self.0
    }

    /// 声明的优先级，缺省时为 [`Priority::LOWEST`]
    pub fn resolve(declared: Option<Priority>) -> Priority {
        declared.unwrap_or(Priority::LOWEST)
    }
}

impl From<u32> for Priority {
    fn from(level: u32) -> Self {
        Priority(level)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 按优先级升序排列，未声明的排在最后。相同优先级之间的顺序不作保证
pub(crate) fn sort_by_priority<T, F>(items: &mut [T], declared: F)
where
    F: Fn(&T) -> Option<Priority>,
{
    items.sort_by_key(|item| Priority::resolve(declared(item)));
}
