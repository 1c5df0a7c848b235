//! 驱动匹配表
//!
//! 有序的 “设备名 → 配置行” 映射。描述符按表中顺序匹配，第一条命中的行生效。
//! 表在进程生命周期内只读。

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// 设备名与表项完全相同
    Exact,
    /// 设备名以表项为前缀
    Prefix,
}

/// 驱动表中的一行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDeviceId {
    /// 匹配键
    pub name: &'static str,
    /// 配置行索引（指向 [`IdTable`] 的配置数组）
    pub driver_data: usize,
    /// 匹配方式
    pub kind: MatchKind,
}

impl PlatformDeviceId {
    /// 精确匹配的表项
    pub const fn exact(name: &'static str, driver_data: usize) -> Self {
        Self {
            name,
            driver_data,
            kind: MatchKind::Exact,
        }
    }

    /// 前缀匹配的表项
    pub const fn prefix(name: &'static str, driver_data: usize) -> Self {
        Self {
            name,
            driver_data,
            kind: MatchKind::Prefix,
        }
    }

    /// 判断设备名是否命中本表项
    pub fn matches(&self, name: &str) -> bool {
        match self.kind {
            MatchKind::Exact => name == self.name,
            MatchKind::Prefix => name.starts_with(self.name),
        }
    }
}

/// 设备相关的静态调优参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// 调优参数 1
    pub cfg_item1: i32,
    /// 调优参数 2
    pub cfg_item2: i32,
}

/// 一次成功匹配的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMatch {
    /// 命中的表项
    pub id: &'static PlatformDeviceId,
    /// 表项对应的配置行
    pub config: DeviceConfig,
}

/// 驱动匹配表
#[derive(Debug, Clone, Copy)]
pub struct IdTable {
    ids: &'static [PlatformDeviceId],
    configs: &'static [DeviceConfig],
}

impl IdTable {
    /// 由表项数组和配置数组构造匹配表
    pub const fn new(ids: &'static [PlatformDeviceId], configs: &'static [DeviceConfig]) -> Self {
        Self { ids, configs }
    }

    /// 按设备名查找配置
    ///
    /// 未命中时返回 None，由调用方解释为“不归本驱动处理”。
    /// `driver_data` 越界的表项视为未命中。
    pub fn lookup(&self, name: &str) -> Option<IdMatch> {
        let id = self.ids.iter().find(|id| id.matches(name))?;
        let config = *self.configs.get(id.driver_data)?;
        Some(IdMatch { id, config })
    }

    /// 所有表项
    pub fn ids(&self) -> &'static [PlatformDeviceId] {
        self.ids
    }
}

/// `pcdev-A1x` 的配置行索引
pub const PCDEV_A1X: usize = 0;
/// `pcdev-B1x` 的配置行索引
pub const PCDEV_B1X: usize = 1;
/// `pcdev-C1x` 的配置行索引
pub const PCDEV_C1X: usize = 2;
/// `pcdev-D1x` 的配置行索引
pub const PCDEV_D1X: usize = 3;

/// 各型号设备的调优参数
pub static PCD_DEVICE_CONFIGS: [DeviceConfig; 4] = [
    DeviceConfig {
        cfg_item1: 60,
        cfg_item2: 21,
    },
    DeviceConfig {
        cfg_item1: 50,
        cfg_item2: 22,
    },
    DeviceConfig {
        cfg_item1: 40,
        cfg_item2: 23,
    },
    DeviceConfig {
        cfg_item1: 30,
        cfg_item2: 24,
    },
];

/// 本驱动支持的设备名
pub static PCD_ID_TABLE: [PlatformDeviceId; 4] = [
    PlatformDeviceId::exact("pcdev-A1x", PCDEV_A1X),
    PlatformDeviceId::exact("pcdev-B1x", PCDEV_B1X),
    PlatformDeviceId::exact("pcdev-C1x", PCDEV_C1X),
    PlatformDeviceId::exact("pcdev-D1x", PCDEV_D1X),
];

/// 默认驱动匹配表
pub static PCD_IDS: IdTable = IdTable::new(&PCD_ID_TABLE, &PCD_DEVICE_CONFIGS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PCD_DEVICE_NAME;

    #[test]
    fn test_default_table_exact_match() {
        let m = PCD_IDS.lookup("pcdev-C1x").unwrap();
        assert_eq!(m.id.driver_data, PCDEV_C1X);
        assert_eq!(
            m.config,
            DeviceConfig {
                cfg_item1: 40,
                cfg_item2: 23
            }
        );
    }

    #[test]
    fn test_default_table_rejects_near_misses() {
        assert!(PCD_IDS.lookup("pcdev-A1").is_none());
        assert!(PCD_IDS.lookup("pcdev-A1xx").is_none());
        assert!(PCD_IDS.lookup("").is_none());
        assert!(PCD_IDS.lookup("other-A1x").is_none());
    }

    #[test]
    fn test_default_names_share_driver_prefix() {
        for id in PCD_IDS.ids() {
            assert!(id.name.starts_with(PCD_DEVICE_NAME));
        }
    }

    static MIXED_IDS: [PlatformDeviceId; 3] = [
        PlatformDeviceId::exact("pcdev-A1x", 0),
        PlatformDeviceId::prefix("pcdev-A", 1),
        PlatformDeviceId::prefix("pcdev-", 2),
    ];
    static MIXED_CONFIGS: [DeviceConfig; 3] = [
        DeviceConfig {
            cfg_item1: 1,
            cfg_item2: 1,
        },
        DeviceConfig {
            cfg_item1: 2,
            cfg_item2: 2,
        },
        DeviceConfig {
            cfg_item1: 3,
            cfg_item2: 3,
        },
    ];

    #[test]
    fn test_first_matching_row_wins() {
        let table = IdTable::new(&MIXED_IDS, &MIXED_CONFIGS);
        assert_eq!(table.lookup("pcdev-A1x").unwrap().config.cfg_item1, 1);
        assert_eq!(table.lookup("pcdev-A2x").unwrap().config.cfg_item1, 2);
        assert_eq!(table.lookup("pcdev-Z").unwrap().config.cfg_item1, 3);
        assert!(table.lookup("pcd").is_none());
    }

    static DANGLING_IDS: [PlatformDeviceId; 1] = [PlatformDeviceId::exact("pcdev-X", 7)];

    #[test]
    fn test_row_without_config_is_not_a_match() {
        let table = IdTable::new(&DANGLING_IDS, &MIXED_CONFIGS);
        assert!(table.lookup("pcdev-X").is_none());
    }
}
