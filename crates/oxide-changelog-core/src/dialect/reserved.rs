//! Reserved words per dialect.
//!
//! Every dialect except Xugu reserves the SQL standard core plus its own
//! extras. XuguDB publishes a complete list of its own, which is used as is.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Words reserved by the SQL standard and every mainstream product.
const SQL_STANDARD: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BOTH", "BY", "CASE", "CAST", "CHECK",
    "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC",
    "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN",
    "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO",
    "IS", "JOIN", "LEADING", "LEFT", "LIKE", "NATURAL", "NOT", "NULL", "ON", "OR", "ORDER",
    "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SESSION_USER", "SET", "SOME", "TABLE",
    "THEN", "TO", "TRAILING", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES",
    "WHEN", "WHERE", "WITH",
];

const POSTGRES: &[&str] = &[
    "ANALYSE", "ANALYZE", "ARRAY", "ASYMMETRIC", "BINARY", "CONCURRENTLY", "DEFERRABLE", "DO",
    "FREEZE", "ILIKE", "INITIALLY", "ISNULL", "LATERAL", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP",
    "NOTNULL", "OFFSET", "ONLY", "OVERLAPS", "PLACING", "RETURNING", "SIMILAR", "SYMMETRIC",
    "VARIADIC", "VERBOSE", "WINDOW",
];

const MYSQL: &[&str] = &[
    "ACCESSIBLE", "ADD", "ANALYZE", "BEFORE", "BIGINT", "BINARY", "BLOB", "CALL", "CASCADE",
    "CHANGE", "CHAR", "CHARACTER", "CONDITION", "CONTINUE", "CONVERT", "DATABASE", "DATABASES",
    "DAY_HOUR", "DECIMAL", "DECLARE", "DELAYED", "DESCRIBE", "DETERMINISTIC", "DIV", "DOUBLE",
    "DUAL", "EACH", "ELSEIF", "ENCLOSED", "ESCAPED", "EXIT", "EXPLAIN", "FLOAT", "FORCE",
    "FULLTEXT", "GENERATED", "GROUPS", "HIGH_PRIORITY", "IF", "IGNORE", "INDEX", "INFILE",
    "INT", "INTEGER", "INTERVAL", "KEY", "KEYS", "KILL", "LIMIT", "LINEAR", "LINES", "LOAD",
    "LOCK", "LONG", "LOOP", "LOW_PRIORITY", "MATCH", "MOD", "MODIFIES", "NO_WRITE_TO_BINLOG",
    "NUMERIC", "OPTIMIZE", "OPTION", "OPTIONALLY", "OUTFILE", "OVER", "PARTITION", "PRECISION",
    "PROCEDURE", "PURGE", "RANGE", "RANK", "READ", "READS", "REAL", "RECURSIVE", "REGEXP",
    "RELEASE", "RENAME", "REPEAT", "REPLACE", "REQUIRE", "RESTRICT", "RETURN", "REVOKE",
    "RLIKE", "ROWS", "ROW_NUMBER", "SCHEMA", "SCHEMAS", "SEPARATOR", "SHOW", "SIGNAL",
    "SMALLINT", "SPATIAL", "SQL", "STARTING", "STRAIGHT_JOIN", "TERMINATED", "TINYINT",
    "TRIGGER", "UNDO", "UNLOCK", "UNSIGNED", "USAGE", "USE", "UTC_DATE", "VARBINARY", "VARCHAR",
    "VARYING", "WHILE", "WINDOW", "WRITE", "XOR", "YEAR_MONTH", "ZEROFILL",
];

const MARIADB: &[&str] = &[
    "OFFSET", "RETURNING",
];

const SQLITE: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "CASCADE",
    "COMMIT", "CONFLICT", "DATABASE", "DEFERRABLE", "DEFERRED", "DETACH", "EACH", "EXCLUSIVE",
    "EXPLAIN", "FAIL", "GLOB", "IF", "IGNORE", "IMMEDIATE", "INDEX", "INDEXED", "INITIALLY",
    "INSTEAD", "ISNULL", "KEY", "LIMIT", "MATCH", "NO", "NOTNULL", "OF", "OFFSET", "PLAN",
    "PRAGMA", "QUERY", "RAISE", "RECURSIVE", "REGEXP", "REINDEX", "RELEASE", "RENAME",
    "REPLACE", "RESTRICT", "ROLLBACK", "ROW", "SAVEPOINT", "TEMP", "TEMPORARY", "TRANSACTION",
    "TRIGGER", "VACUUM", "VIEW", "VIRTUAL",
];

const MSSQL: &[&str] = &[
    "ADD", "BACKUP", "BEGIN", "BREAK", "BROWSE", "BULK", "CASCADE", "CHECKPOINT", "CLOSE",
    "CLUSTERED", "COALESCE", "COMMIT", "COMPUTE", "CONTAINS", "CONTAINSTABLE", "CONTINUE",
    "CONVERT", "DATABASE", "DBCC", "DEALLOCATE", "DECLARE", "DENY", "DISK", "DISTRIBUTED",
    "DOUBLE", "DUMP", "ERRLVL", "ESCAPE", "EXEC", "EXECUTE", "EXIT", "EXTERNAL", "FILE",
    "FILLFACTOR", "FREETEXT", "FREETEXTTABLE", "FUNCTION", "GOTO", "HOLDLOCK", "IDENTITY",
    "IDENTITYCOL", "IDENTITY_INSERT", "IF", "INDEX", "KEY", "KILL", "LINENO", "LOAD", "MERGE",
    "NATIONAL", "NOCHECK", "NONCLUSTERED", "NULLIF", "OF", "OFF", "OFFSETS", "OPEN",
    "OPENDATASOURCE", "OPENQUERY", "OPENROWSET", "OPENXML", "OPTION", "OVER", "PERCENT",
    "PIVOT", "PLAN", "PRECISION", "PRINT", "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ",
    "READTEXT", "RECONFIGURE", "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT",
    "REVOKE", "ROLLBACK", "ROWCOUNT", "ROWGUIDCOL", "RULE", "SAVE", "SCHEMA", "SECURITYAUDIT",
    "SETUSER", "SHUTDOWN", "STATISTICS", "SYSTEM_USER", "TABLESAMPLE", "TEXTSIZE", "TOP",
    "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE", "TRY_CONVERT", "TSEQUAL", "UNPIVOT",
    "UPDATETEXT", "USE", "VARYING", "VIEW", "WAITFOR", "WHILE", "WITHIN", "WRITETEXT",
];

const ORACLE: &[&str] = &[
    "ACCESS", "ADD", "AUDIT", "CHAR", "CLUSTER", "COMMENT", "COMPRESS", "CONNECT", "DATE",
    "DECIMAL", "EXCLUSIVE", "FILE", "FLOAT", "IDENTIFIED", "IMMEDIATE", "INCREMENT", "INDEX",
    "INITIAL", "INTEGER", "LEVEL", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE",
    "MODIFY", "NOAUDIT", "NOCOMPRESS", "NOWAIT", "NUMBER", "OF", "OFFLINE", "ONLINE", "OPTION",
    "PCTFREE", "PRIOR", "PRIVILEGES", "PUBLIC", "RAW", "RENAME", "RESOURCE", "REVOKE", "ROW",
    "ROWID", "ROWNUM", "ROWS", "SESSION", "SHARE", "SIZE", "SMALLINT", "START", "SUCCESSFUL",
    "SYNONYM", "SYSDATE", "TRIGGER", "UID", "VALIDATE", "VARCHAR", "VARCHAR2", "VIEW",
    "WHENEVER",
];

const H2: &[&str] = &[
    "CURRENT_CATALOG", "CURRENT_SCHEMA", "DAY", "HOUR", "IF", "ILIKE", "INTERVAL", "KEY",
    "LIMIT", "MINUS", "MINUTE", "MONTH", "OFFSET", "QUALIFY", "REGEXP", "ROW", "ROWNUM",
    "SECOND", "SYSDATE", "SYSTIME", "SYSTIMESTAMP", "TODAY", "TOP", "VALUE", "WINDOW", "YEAR",
    "_ROWID_",
];

const DUCKDB: &[&str] = &[
    "ANALYSE", "ANALYZE", "ARRAY", "ASYMMETRIC", "COLUMNS", "DEFERRABLE", "DESCRIBE", "DO",
    "GROUPS", "ILIKE", "INITIALLY", "LATERAL", "LIMIT", "OFFSET", "ONLY", "PIVOT",
    "PIVOT_LONGER", "PIVOT_WIDER", "PLACING", "QUALIFY", "RETURNING", "SHOW", "SUMMARIZE",
    "SYMMETRIC", "UNPIVOT", "VARIADIC", "WINDOW",
];

/// XuguDB's full reserved word list.
const XUGU: &[&str] = &[
    "ABORT", "ABOVE", "ABSOLUTE", "ACCESS", "ACCOUNT", "ACTION", "ADD", "AFTER", "AGGREGATE",
    "ALL", "ALL_ROWS", "ALTER", "ANALYSE", "ANALYZE", "AND", "ANY", "AOVERLAPS", "APPEND",
    "ARCHIVELOG", "ARE", "ARRAY", "AS", "ASC", "AT", "AUDIT", "AUDITOR", "AUTHID",
    "AUTHORIZATION", "AUTO", "BACKUP", "BACKWARD", "BADFILE", "BCONTAINS", "BEFORE", "BEGIN",
    "BETWEEN", "BINARY", "BINTERSECTS", "BIT", "BLOCK", "BLOCKS", "BODY", "BOTH", "BOUND",
    "BOVERLAPS", "BREAK", "BUFFER_POOL", "BUILD", "BULK", "BWITHIN", "BY", "CACHE", "CALL",
    "CASCADE", "CASE", "CAST", "CATCH", "CATEGORY", "CHAIN", "CHAR", "CHARACTER",
    "CHARACTERISTICS", "CHECK", "CHECKPOINT", "CHOOSE", "CHUNK", "CLOSE", "CLUSTER", "COALESCE",
    "COLLATE", "COLLECT", "COLUMN", "COLUMNS", "COMMENT", "COMMIT", "COMMITTED", "COMPLETE",
    "COMPRESS", "COMPUTE", "CONNECT", "CONNECT_NODES", "CONSTANT", "CONSTRAINT", "CONSTRAINTS",
    "CONSTRUCTOR", "CONTAINS", "CONTEXT", "CONTINUE", "COPY", "CORRESPONDING", "CPU_PER_CALL",
    "CPU_PER_SESSION", "CREATE", "CREATEDB", "CREATEUSER", "CROSS", "CROSSES", "CUBE",
    "CURRENT", "CURSOR", "CURSOR_QUOTA", "CYCLE", "DATABASE", "DATAFILE", "DATE", "DATETIME",
    "DAY", "DBA", "DEALLOCATE", "DEC", "DECIMAL", "DECLARE", "DECODE", "DECRYPT", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DELIMITED", "DELIMITERS", "DEMAND", "DESC", "DESCRIBE",
    "DETERMINISTIC", "DIR", "DISABLE", "DISASSEMBLE", "DISCORDFILE", "DISJOINT", "DISTINCT",
    "DO", "DOMAIN", "DOUBLE", "DRIVEN", "DROP", "EACH", "ELEMENT", "ELSE", "ELSEIF", "ELSIF",
    "ENABLE", "ENCODING", "ENCRYPT", "ENCRYPTOR", "END", "ENDCASE", "ENDFOR", "ENDIF",
    "ENDLOOP", "EQUALS", "ESCAPE", "EVERY", "EXCEPT", "EXCEPTION", "EXCEPTIONS",
    "EXCEPTION_INIT", "EXCLUSIVE", "EXEC", "EXECUTE", "EXISTS", "EXIT", "EXPIRE", "EXPLAIN",
    "EXPORT", "EXTEND", "EXTERNAL", "EXTRACT", "FAILED_LOGIN_ATTEMPTS", "FALSE", "FAST",
    "FETCH", "FIELD", "FIELDS", "FILTER", "FINAL", "FINALLY", "FIRST", "FIRST_ROWS",
    "FLASHBACK", "FLOAT", "FOLLOWING", "FOR", "FORALL", "FORCE", "FOREIGN", "FORWARD", "FOUND",
    "FREELIST", "FREELISTS", "FROM", "FULL", "FUNCTION", "G", "GENERATED", "GET", "GLOBAL",
    "GOTO", "GRANT", "GREATEST", "GROUP", "GROUPING", "GROUPS", "HANDLER", "HASH", "HAVING",
    "HEAP", "HIDE", "HINT", "HOTSPOT", "HOUR", "IDENTIFIED", "IDENTIFIER", "IDENTITY", "IF",
    "IGNORE", "ILIKE", "IMMEDIATE", "IMPORT", "IN", "INCLUDE", "INCREMENT", "INDEX",
    "INDEXTYPE", "INDEX_ASC", "INDEX_DESC", "INDEX_FSS", "INDEX_JOIN", "INDICATOR", "INDICES",
    "INHERITS", "INIT", "INITIAL", "INITIALLY", "INITRANS", "INNER", "INOUT", "INSENSITIVE",
    "INSERT", "INSTANTIABLE", "INSTEAD", "INTERSECT", "INTERSECTS", "INTERVAL", "INTO", "IO",
    "IS", "ISNULL", "ISOLATION", "ISOPEN", "JOB", "JOIN", "K", "KEEP", "KEY", "KEYSET", "LABEL",
    "LANGUAGE", "LAST", "LEADING", "LEAST", "LEAVE", "LEFT", "LEFTOF", "LENGTH", "LESS",
    "LEVEL", "LEVELS", "LEXER", "LIBRARY", "LIKE", "LIMIT", "LINK", "LIST", "LISTEN", "LOAD",
    "LOB", "LOCAL", "LOCATION", "LOCATOR", "LOCK", "LOGFILE", "LOGGING", "LOGIN", "LOGOFF",
    "LOGON", "LOGOUT", "LOOP", "LOVERLAPS", "M", "MATCH", "MATCHED", "MATERIALIZED", "MAX",
    "MAXEXTENTS", "MAXSIZE", "MAXTRANS", "MAXVALUE", "MAXVALUES", "MAX_CONNECT_TIME",
    "MAX_IDLE_TIME", "MAX_STORE_NUM", "MEMBER", "MEMORY", "MERGE", "MINEXTENTS", "MINUS",
    "MINUTE", "MINVALUE", "MISSING", "MODE", "MODIFY", "MONTH", "MOVEMENT", "NAME", "NAMES",
    "NATIONAL", "NATURAL", "NCHAR", "NESTED", "NEW", "NEWLINE", "NEXT", "NO", "NOAPPEND",
    "NOARCHIVELOG", "NOAUDIT", "NOCACHE", "NOCOMPRESS", "NOCREATEDB", "NOCREATEUSER", "NOCYCLE",
    "NODE", "NOFORCE", "NOFOUND", "NOINDEX", "NOLOGGING", "NONE", "NOORDER", "NOPARALLEL",
    "NOT", "NOTFOUND", "NOTHING", "NOTIFY", "NOTNULL", "NOVALIDATE", "NOWAIT", "NULL", "NULLIF",
    "NULLS", "NUMBER", "NUMERIC", "NVARCHAR", "NVARCHAR2", "NVL", "NVL2", "OBJECT", "OF", "OFF",
    "OFFLINE", "OFFSET", "OIDINDEX", "OIDS", "OLD", "ON", "ONLINE", "ONLY", "OPEN", "OPERATOR",
    "OPTION", "OR", "ORDER", "ORDERD", "ORGANIZATION", "OTHERVALUES", "OUT", "OUTER", "OVER",
    "OVERLAPS", "OWNER", "PACKAGE", "PARALLEL", "PARAMETERS", "PARTIAL", "PARTITION",
    "PARTITIONS", "PASSWORD", "PASSWORD_LIFE_PERIOD", "PASSWORD_LOCK_TIME", "PCTFREE",
    "PCTINCREASE", "PCTUSED", "PCTVERSION", "PERIOD", "POLICY", "PRAGMA", "PREBUILT",
    "PRECEDING", "PRECISION", "PREPARE", "PRESERVE", "PRIMARY", "PRIOR", "PRIORITY",
    "PRIVATE_SGA", "PRIVILEGES", "PROCEDURAL", "PROCEDURE", "PROFILE", "PROTECTED", "PUBLIC",
    "QUERY", "QUOTA", "RAISE", "RANGE", "RAW", "READ", "READS", "READS_PER_CALL",
    "READS_PER_SESSION", "REBUILD", "RECOMPILE", "RECORD", "RECORDS", "RECYCLE", "REDUCED",
    "REF", "REFERENCES", "REFERENCING", "REFRESH", "REINDEX", "RELATIVE", "RENAME",
    "REPEATABLE", "REPLACE", "REPLICATION", "RESOURCE", "RESTART", "RESTORE", "RESTRICT",
    "RESULT", "RESULT_CACHE", "RETURN", "RETURNING", "REVERSE", "REVOKE", "REWRITE", "RIGHT",
    "RIGHTOF", "ROLE", "ROLLBACK", "ROLLUP", "ROVERLAPS", "ROW", "ROWCOUNT", "ROWID", "ROWS",
    "ROWTYPE", "RULE", "RUN", "SAVEPOINT", "SCHEMA", "SCROLL", "SECOND", "SEGMENT", "SELECT",
    "SELF", "SEQUENCE", "SERIALIZABLE", "SESSION", "SESSION_PER_USER", "SET", "SETOF", "SETS",
    "SHARE", "SHOW", "SHUTDOWN", "SIBLINGS", "SIZE", "SLOW", "SNAPSHOT", "SOME", "SPATIAL",
    "SPLIT", "SSO", "STANDBY", "START", "STATEMENT", "STATIC", "STATISTICS", "STEP", "STOP",
    "STORAGE", "STORE", "STORE_NODES", "STREAM", "SUBPARTITION", "SUBPARTITIONS", "SUBTYPE",
    "SUCCESSFUL", "SYNONYM", "SYSTEM", "TABLE", "TABLESPACE", "TEMP", "TEMPLATE", "TEMPORARY",
    "TEMPSPACE_QUOTA", "TERMINATED", "THAN", "THEN", "THROW", "TIME", "TIMESTAMP", "TO", "TOP",
    "TOPOVERLAPS", "TOTAL_RESOURCE_LIMIT", "TOUCHES", "TRACE", "TRAILING", "TRAN",
    "TRANSACTION", "TRIGGER", "TRUE", "TRUNCATE", "TRUSTED", "TRY", "TYPE", "UNBOUNDED",
    "UNDER", "UNDO", "UNIFORM", "UNION", "UNIQUE", "UNLIMITED", "UNLISTEN", "UNLOCK",
    "UNPROTECTED", "UNTIL", "UOVERLAPS", "UPDATE", "USE", "USER", "USE_HASH", "USING", "VACUUM",
    "VALID", "VALIDATE", "VALUE", "VALUES", "VARCHAR", "VARCHAR2", "VARRAY", "VARYING",
    "VERBOSE", "VERSION", "VIEW", "VOCABLE", "WAIT", "WHEN", "WHENEVER", "WHERE", "WHILE",
    "WITH", "WITHIN", "WITHOUT", "WORK", "WRITE", "XML", "YEAR", "ZONE",
];

static RESERVED_WORDS: LazyLock<HashMap<&'static str, HashSet<&'static str>>> =
    LazyLock::new(|| {
        let standard_plus = |extra: &[&'static str]| -> HashSet<&'static str> {
            SQL_STANDARD.iter().chain(extra).copied().collect()
        };
        let mut words = HashMap::new();
        words.insert("postgresql", standard_plus(POSTGRES));
        words.insert("mysql", standard_plus(MYSQL));
        words.insert(
            "mariadb",
            SQL_STANDARD
                .iter()
                .chain(MYSQL)
                .chain(MARIADB)
                .copied()
                .collect(),
        );
        words.insert("sqlite", standard_plus(SQLITE));
        words.insert("mssql", standard_plus(MSSQL));
        words.insert("oracle", standard_plus(ORACLE));
        words.insert("h2", standard_plus(H2));
        words.insert("duckdb", standard_plus(DUCKDB));
        words.insert("xugu", XUGU.iter().copied().collect());
        words
    });

/// True when `word` is reserved by the dialect named `short_name`.
///
/// Unknown dialects fall back to the SQL standard core.
#[must_use]
pub fn is_reserved(short_name: &str, word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_WORDS.get(short_name).map_or_else(
        || SQL_STANDARD.contains(&upper.as_str()),
        |words| words.contains(upper.as_str()),
    )
}

/// Every word reserved by a dialect, sorted.
#[must_use]
pub fn reserved_words(short_name: &str) -> Vec<&'static str> {
    let mut words: Vec<&'static str> = RESERVED_WORDS
        .get(short_name)
        .map_or_else(|| SQL_STANDARD.to_vec(), |w| w.iter().copied().collect());
    words.sort_unstable();
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_words_are_reserved_everywhere() {
        for dialect in ["postgresql", "mysql", "sqlite", "mssql", "oracle", "h2", "duckdb", "xugu"] {
            assert!(is_reserved(dialect, "order"), "{dialect}");
            assert!(is_reserved(dialect, "SELECT"), "{dialect}");
        }
    }

    #[test]
    fn test_dialect_specific_words() {
        assert!(is_reserved("postgresql", "limit"));
        assert!(!is_reserved("mssql", "limit"));
        assert!(is_reserved("mssql", "top"));
        assert!(is_reserved("oracle", "rownum"));
        assert!(!is_reserved("postgresql", "name"));
    }

    #[test]
    fn test_xugu_list_is_complete() {
        let words = reserved_words("xugu");
        assert_eq!(words.len(), 571);
        assert!(is_reserved("xugu", "name"));
        assert!(is_reserved("xugu", "Label"));
        assert!(is_reserved("xugu", "value"));
        assert!(!is_reserved("xugu", "email"));
    }

    #[test]
    fn test_unknown_dialect_uses_standard_core() {
        assert!(is_reserved("unknown", "where"));
        assert!(!is_reserved("unknown", "limit"));
    }
}
