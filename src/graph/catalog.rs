//! Known contents of framework and common package namespaces.
//!
//! Source declarations cover only the analyzed solution. A namespace such as
//! `System.Linq` is never declared there, so the code-style analyzer consults
//! this catalog to decide whether an import of it is used. Entries list the
//! commonly reachable types and extension methods, never all of them.

/// Exported names of one external namespace
#[derive(Debug, Clone, Copy)]
pub struct NamespaceEntry {
    pub namespace: &'static str,
    pub types: &'static [&'static str],
    pub extension_methods: &'static [&'static str],
}

impl NamespaceEntry {
    pub fn exports_type(&self, name: &str) -> bool {
        self.types.contains(&name)
    }

    pub fn exports_extension(&self, name: &str) -> bool {
        self.extension_methods.contains(&name)
    }
}

const LINQ_METHODS: &[&str] = &[
    "Aggregate", "All", "Any", "Append", "AsEnumerable", "AsQueryable", "Average", "Cast",
    "Chunk", "Concat", "Contains", "Count", "DefaultIfEmpty", "Distinct", "DistinctBy",
    "ElementAt", "ElementAtOrDefault", "Except", "ExceptBy", "First", "FirstOrDefault",
    "GroupBy", "GroupJoin", "Intersect", "IntersectBy", "Join", "Last", "LastOrDefault",
    "LongCount", "Max", "MaxBy", "Min", "MinBy", "OfType", "Order", "OrderBy",
    "OrderByDescending", "OrderDescending", "Prepend", "Reverse", "Select", "SelectMany",
    "SequenceEqual", "Single", "SingleOrDefault", "Skip", "SkipLast", "SkipWhile", "Sum",
    "Take", "TakeLast", "TakeWhile", "ThenBy", "ThenByDescending", "ToArray", "ToDictionary",
    "ToHashSet", "ToList", "ToLookup", "TryGetNonEnumeratedCount", "Union", "UnionBy",
    "Where", "Zip",
];

static CATALOG: &[NamespaceEntry] = &[
    NamespaceEntry {
        namespace: "System.Linq",
        types: &[
            "Enumerable", "Queryable", "IQueryable", "IOrderedEnumerable", "IOrderedQueryable",
            "IGrouping", "ILookup", "Lookup", "ParallelEnumerable", "ParallelQuery",
            "IQueryProvider",
        ],
        extension_methods: LINQ_METHODS,
    },
    NamespaceEntry {
        namespace: "System.Collections.Generic",
        types: &[
            "List", "Dictionary", "HashSet", "SortedSet", "SortedDictionary", "SortedList",
            "Queue", "Stack", "LinkedList", "LinkedListNode", "PriorityQueue", "KeyValuePair",
            "IEnumerable", "IEnumerator", "ICollection", "IList", "IDictionary", "ISet",
            "IReadOnlyCollection", "IReadOnlyList", "IReadOnlyDictionary", "IReadOnlySet",
            "IAsyncEnumerable", "IAsyncEnumerator", "IComparer", "IEqualityComparer", "Comparer",
            "EqualityComparer", "KeyNotFoundException", "CollectionExtensions",
            "ReferenceEqualityComparer",
        ],
        extension_methods: &["GetValueOrDefault", "TryAdd", "Remove", "AsReadOnly"],
    },
    NamespaceEntry {
        namespace: "System.Collections",
        types: &[
            "ArrayList", "Hashtable", "IEnumerable", "IEnumerator", "ICollection", "IList",
            "IDictionary", "IComparer", "IEqualityComparer", "BitArray", "DictionaryEntry",
            "IStructuralEquatable", "IStructuralComparable", "CollectionBase", "Queue", "Stack",
            "SortedList",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Collections.Concurrent",
        types: &[
            "ConcurrentDictionary", "ConcurrentQueue", "ConcurrentStack", "ConcurrentBag",
            "BlockingCollection", "IProducerConsumerCollection", "Partitioner",
            "OrderablePartitioner",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Text",
        types: &[
            "StringBuilder", "Encoding", "UTF8Encoding", "ASCIIEncoding", "UnicodeEncoding",
            "Encoder", "Decoder", "Rune", "NormalizationForm", "CompositeFormat",
            "EncoderFallback", "DecoderFallback",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Text.RegularExpressions",
        types: &[
            "Regex", "Match", "MatchCollection", "Group", "GroupCollection", "Capture",
            "CaptureCollection", "RegexOptions", "RegexMatchTimeoutException",
            "GeneratedRegex", "GeneratedRegexAttribute", "ValueMatch",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Text.Json",
        types: &[
            "JsonSerializer", "JsonSerializerOptions", "JsonDocument", "JsonElement",
            "JsonException", "JsonNamingPolicy", "JsonValueKind", "Utf8JsonWriter",
            "Utf8JsonReader", "JsonTokenType", "JsonProperty", "JsonSerializerDefaults",
            "JsonDocumentOptions", "JsonWriterOptions", "JsonReaderOptions",
            "JsonCommentHandling",
        ],
        extension_methods: &["Deserialize"],
    },
    NamespaceEntry {
        namespace: "System.Text.Json.Serialization",
        types: &[
            "JsonPropertyName", "JsonPropertyNameAttribute", "JsonIgnore",
            "JsonIgnoreAttribute", "JsonConverter", "JsonConverterAttribute",
            "JsonStringEnumConverter", "JsonIgnoreCondition", "JsonInclude",
            "JsonIncludeAttribute", "JsonConstructor", "JsonConstructorAttribute",
            "JsonExtensionData", "JsonExtensionDataAttribute", "JsonSerializable",
            "JsonSerializableAttribute", "JsonSerializerContext", "JsonNumberHandling",
            "JsonPropertyOrder", "JsonPropertyOrderAttribute", "JsonDerivedType",
            "JsonDerivedTypeAttribute", "JsonPolymorphic", "JsonPolymorphicAttribute",
            "ReferenceHandler",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Threading.Tasks",
        types: &[
            "Task", "ValueTask", "TaskCompletionSource", "TaskFactory", "TaskScheduler",
            "TaskStatus", "TaskCreationOptions", "TaskContinuationOptions", "Parallel",
            "ParallelOptions", "ParallelLoopResult", "ParallelLoopState",
            "TaskCanceledException", "UnobservedTaskExceptionEventArgs",
            "ConfigureAwaitOptions",
        ],
        extension_methods: &["WaitAsync"],
    },
    NamespaceEntry {
        namespace: "System.Threading",
        types: &[
            "CancellationToken", "CancellationTokenSource", "CancellationTokenRegistration",
            "Thread", "ThreadPool", "Monitor", "Mutex", "Semaphore", "SemaphoreSlim",
            "Interlocked", "Volatile", "Timer", "TimerCallback", "Lock", "ReaderWriterLock",
            "ReaderWriterLockSlim", "ManualResetEvent", "ManualResetEventSlim",
            "AutoResetEvent", "CountdownEvent", "Barrier", "SpinLock", "SpinWait",
            "ThreadLocal", "AsyncLocal", "Lazy", "LazyInitializer", "LazyThreadSafetyMode",
            "SynchronizationContext", "ExecutionContext", "WaitHandle", "ThreadStart",
            "ParameterizedThreadStart", "ThreadPriority", "ThreadState", "Timeout",
            "OperationCanceledException", "PeriodicTimer",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.IO",
        types: &[
            "File", "FileInfo", "Directory", "DirectoryInfo", "Path", "Stream", "FileStream",
            "MemoryStream", "BufferedStream", "StreamReader", "StreamWriter", "StringReader",
            "StringWriter", "TextReader", "TextWriter", "BinaryReader", "BinaryWriter",
            "FileMode", "FileAccess", "FileShare", "FileOptions", "FileAttributes",
            "SearchOption", "SeekOrigin", "IOException", "FileNotFoundException",
            "DirectoryNotFoundException", "PathTooLongException", "EndOfStreamException",
            "FileSystemWatcher", "FileSystemEventArgs", "FileSystemEventHandler",
            "RenamedEventArgs", "FileSystemInfo", "DriveInfo", "EnumerationOptions",
            "UnmanagedMemoryStream", "InvalidDataException",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Diagnostics",
        types: &[
            "Debug", "Trace", "Stopwatch", "Process", "ProcessStartInfo", "Activity",
            "ActivitySource", "ActivityKind", "Debugger", "DebuggerDisplay",
            "DebuggerDisplayAttribute", "DebuggerStepThrough", "DebuggerStepThroughAttribute",
            "DebuggerHidden", "DebuggerHiddenAttribute", "DebuggerBrowsable",
            "DebuggerBrowsableAttribute", "DebuggerBrowsableState", "Conditional",
            "ConditionalAttribute", "StackTrace", "StackFrame", "EventLog", "TraceListener",
            "TraceSource", "TraceLevel", "UnreachableException", "DiagnosticSource",
            "DiagnosticListener", "FileVersionInfo",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Net.Http",
        types: &[
            "HttpClient", "HttpClientHandler", "HttpRequestMessage", "HttpResponseMessage",
            "HttpMethod", "HttpContent", "StringContent", "ByteArrayContent", "StreamContent",
            "FormUrlEncodedContent", "MultipartContent", "MultipartFormDataContent",
            "HttpRequestException", "HttpMessageHandler", "DelegatingHandler",
            "SocketsHttpHandler", "HttpCompletionOption", "IHttpClientFactory",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.ComponentModel.DataAnnotations",
        types: &[
            "Required", "RequiredAttribute", "StringLength", "StringLengthAttribute", "Range",
            "RangeAttribute", "MaxLength", "MaxLengthAttribute", "MinLength",
            "MinLengthAttribute", "RegularExpression", "RegularExpressionAttribute", "Key",
            "KeyAttribute", "EmailAddress", "EmailAddressAttribute", "Display",
            "DisplayAttribute", "Compare", "CompareAttribute", "Phone", "PhoneAttribute", "Url",
            "UrlAttribute", "ValidationAttribute", "ValidationContext", "ValidationResult",
            "Validator", "IValidatableObject", "DataType", "DataTypeAttribute",
            "ConcurrencyCheck", "ConcurrencyCheckAttribute", "Timestamp", "TimestampAttribute",
            "ValidationException",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Xml.Linq",
        types: &[
            "XDocument", "XElement", "XAttribute", "XNamespace", "XName", "XNode",
            "XContainer", "XText", "XComment", "XCData", "XDeclaration",
            "XProcessingInstruction", "LoadOptions", "SaveOptions", "Extensions",
        ],
        extension_methods: &["Elements", "Descendants", "Attributes", "Ancestors", "Nodes", "DescendantNodes"],
    },
    NamespaceEntry {
        namespace: "System.Globalization",
        types: &[
            "CultureInfo", "NumberStyles", "DateTimeStyles", "NumberFormatInfo",
            "DateTimeFormatInfo", "CompareInfo", "CompareOptions", "TextInfo", "RegionInfo",
            "Calendar", "GregorianCalendar", "UnicodeCategory", "CharUnicodeInfo",
            "StringInfo", "CultureNotFoundException", "CultureTypes",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System",
        types: &[
            "Console", "Math", "MathF", "String", "DateTime", "DateTimeOffset", "DateOnly",
            "TimeOnly", "TimeSpan", "Guid", "Convert", "Environment", "Exception",
            "ArgumentException", "ArgumentNullException", "ArgumentOutOfRangeException",
            "InvalidOperationException", "NotImplementedException", "NotSupportedException",
            "NullReferenceException", "FormatException", "OverflowException",
            "ObjectDisposedException", "OperationCanceledException", "TimeoutException",
            "UnauthorizedAccessException", "IDisposable", "IAsyncDisposable", "Action", "Func",
            "Predicate", "EventHandler", "EventArgs", "Lazy", "Nullable", "Random", "Tuple",
            "ValueTuple", "Uri", "UriKind", "Type", "Attribute", "AttributeUsage",
            "AttributeUsageAttribute", "AttributeTargets", "Obsolete", "ObsoleteAttribute",
            "Serializable", "SerializableAttribute", "Flags", "FlagsAttribute", "Enum", "Array",
            "Span", "ReadOnlySpan", "Memory", "ReadOnlyMemory", "Int32", "Int64", "Int16",
            "UInt32", "UInt64", "Byte", "SByte", "Double", "Single", "Decimal", "Boolean", "Char",
            "Object", "GC", "IComparable", "IEquatable", "IFormattable", "ICloneable",
            "StringComparison", "StringComparer", "StringSplitOptions", "BitConverter",
            "Buffer", "Activator", "AppDomain", "DayOfWeek", "Index", "Range", "HashCode",
            "IServiceProvider", "IProgress", "Progress", "WeakReference", "MidpointRounding",
            "DBNull", "AggregateException", "KeyNotFoundException", "TimeZoneInfo",
            "Delegate", "MulticastDelegate", "Half", "Int128", "UInt128", "IntPtr", "UIntPtr",
            "ConsoleColor", "ConsoleKey", "ConsoleKeyInfo", "Version", "Base64FormattingOptions",
            "StackOverflowException", "IndexOutOfRangeException", "InvalidCastException",
            "DivideByZeroException", "OutOfMemoryException", "PlatformNotSupportedException",
            "ApplicationException", "SystemException", "MemoryExtensions", "ArraySegment",
            "TimeProvider",
        ],
        extension_methods: &["AsSpan", "AsMemory"],
    },
    NamespaceEntry {
        namespace: "System.ComponentModel",
        types: &[
            "INotifyPropertyChanged", "INotifyPropertyChanging", "PropertyChangedEventArgs",
            "PropertyChangedEventHandler", "PropertyChangingEventArgs", "Description",
            "DescriptionAttribute", "DisplayName", "DisplayNameAttribute", "DefaultValue",
            "DefaultValueAttribute", "Browsable", "BrowsableAttribute", "Category",
            "CategoryAttribute", "EditorBrowsable", "EditorBrowsableAttribute",
            "EditorBrowsableState", "TypeConverter", "TypeConverterAttribute",
            "TypeDescriptor", "Component", "IComponent", "CancelEventArgs",
            "BackgroundWorker", "Win32Exception", "ReadOnly", "ReadOnlyAttribute",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Runtime.CompilerServices",
        types: &[
            "CallerMemberName", "CallerMemberNameAttribute", "CallerFilePath",
            "CallerFilePathAttribute", "CallerLineNumber", "CallerLineNumberAttribute",
            "CallerArgumentExpression", "CallerArgumentExpressionAttribute",
            "InternalsVisibleTo", "InternalsVisibleToAttribute", "MethodImpl",
            "MethodImplAttribute", "MethodImplOptions", "ModuleInitializer",
            "ModuleInitializerAttribute", "RuntimeHelpers", "Unsafe", "ConditionalWeakTable",
            "TaskAwaiter", "ValueTaskAwaiter", "ConfiguredTaskAwaitable",
            "EnumeratorCancellation", "EnumeratorCancellationAttribute", "IsExternalInit",
            "SkipLocalsInit", "SkipLocalsInitAttribute", "InterpolatedStringHandler",
            "InterpolatedStringHandlerAttribute", "DefaultInterpolatedStringHandler",
            "AsyncMethodBuilder", "AsyncMethodBuilderAttribute",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "System.Reflection",
        types: &[
            "Assembly", "AssemblyName", "MethodInfo", "PropertyInfo", "FieldInfo",
            "ConstructorInfo", "MemberInfo", "ParameterInfo", "EventInfo", "BindingFlags",
            "MethodBase", "TypeInfo", "CustomAttributeExtensions", "TargetInvocationException",
            "AmbiguousMatchException", "Module", "MemberTypes", "AssemblyVersion",
            "AssemblyVersionAttribute", "AssemblyTitle", "AssemblyTitleAttribute",
            "AssemblyInformationalVersionAttribute", "DefaultMemberAttribute",
            "IntrospectionExtensions", "NullabilityInfoContext",
        ],
        extension_methods: &["GetCustomAttribute", "GetCustomAttributes", "GetTypeInfo", "IsDefined"],
    },
    NamespaceEntry {
        namespace: "System.Runtime.InteropServices",
        types: &[
            "DllImport", "DllImportAttribute", "LibraryImport", "LibraryImportAttribute",
            "Marshal", "MarshalAs", "MarshalAsAttribute", "UnmanagedType", "StructLayout",
            "StructLayoutAttribute", "LayoutKind", "FieldOffset", "FieldOffsetAttribute",
            "GCHandle", "GCHandleType", "SafeHandle", "CharSet", "CallingConvention",
            "ComVisible", "ComVisibleAttribute", "Guid", "GuidAttribute", "In", "InAttribute",
            "Out", "OutAttribute", "Optional", "OptionalAttribute", "RuntimeInformation",
            "OSPlatform", "Architecture", "MemoryMarshal", "CollectionsMarshal",
            "NativeMemory", "ExternalException", "COMException",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "Microsoft.Extensions.DependencyInjection",
        types: &[
            "IServiceCollection", "ServiceCollection", "ServiceProvider", "ServiceDescriptor",
            "ServiceLifetime", "IServiceScope", "IServiceScopeFactory",
            "ActivatorUtilities", "ServiceCollectionServiceExtensions",
            "ServiceProviderServiceExtensions", "FromKeyedServices",
            "FromKeyedServicesAttribute",
        ],
        extension_methods: &[
            "AddSingleton", "AddScoped", "AddTransient", "AddKeyedSingleton", "AddKeyedScoped",
            "AddKeyedTransient", "GetService", "GetRequiredService", "GetServices",
            "GetKeyedService", "GetRequiredKeyedService", "CreateScope", "CreateAsyncScope",
            "BuildServiceProvider", "AddLogging", "AddOptions", "Configure", "AddHttpClient",
            "AddHostedService", "TryAddSingleton", "TryAddScoped", "TryAddTransient",
        ],
    },
    NamespaceEntry {
        namespace: "Microsoft.Extensions.Logging",
        types: &[
            "ILogger", "ILoggerFactory", "ILoggerProvider", "LogLevel", "EventId",
            "LoggerFactory", "LoggerMessage", "LoggerMessageAttribute", "NullLogger",
            "ILoggingBuilder",
        ],
        extension_methods: &[
            "LogTrace", "LogDebug", "LogInformation", "LogWarning", "LogError", "LogCritical",
            "Log", "BeginScope", "CreateLogger", "AddConsole", "AddDebug", "SetMinimumLevel",
            "AddFilter", "ClearProviders",
        ],
    },
    NamespaceEntry {
        namespace: "Xunit",
        types: &[
            "Fact", "FactAttribute", "Theory", "TheoryAttribute", "InlineData",
            "InlineDataAttribute", "MemberData", "MemberDataAttribute", "ClassData",
            "ClassDataAttribute", "Assert", "IClassFixture", "ICollectionFixture",
            "Collection", "CollectionAttribute", "CollectionDefinition",
            "CollectionDefinitionAttribute", "Trait", "TraitAttribute", "IAsyncLifetime",
            "TheoryData", "Record",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "NUnit.Framework",
        types: &[
            "Test", "TestAttribute", "TestCase", "TestCaseAttribute", "TestFixture",
            "TestFixtureAttribute", "SetUp", "SetUpAttribute", "TearDown", "TearDownAttribute",
            "OneTimeSetUp", "OneTimeSetUpAttribute", "OneTimeTearDown",
            "OneTimeTearDownAttribute", "Assert", "Is", "Has", "Does", "Throws", "Contains",
            "Category", "CategoryAttribute", "Ignore", "IgnoreAttribute", "TestCaseSource",
            "TestCaseSourceAttribute", "Values", "ValuesAttribute", "CollectionAssert",
            "StringAssert", "Assume", "Warn",
        ],
        extension_methods: &[],
    },
    NamespaceEntry {
        namespace: "Microsoft.AspNetCore.Mvc",
        types: &[
            "Controller", "ControllerBase", "ApiController", "ApiControllerAttribute",
            "Route", "RouteAttribute", "HttpGet", "HttpGetAttribute", "HttpPost",
            "HttpPostAttribute", "HttpPut", "HttpPutAttribute", "HttpDelete",
            "HttpDeleteAttribute", "HttpPatch", "HttpPatchAttribute", "FromBody",
            "FromBodyAttribute", "FromQuery", "FromQueryAttribute", "FromRoute",
            "FromRouteAttribute", "FromForm", "FromFormAttribute", "FromServices",
            "FromServicesAttribute", "FromHeader", "FromHeaderAttribute", "IActionResult",
            "ActionResult", "OkResult", "OkObjectResult", "NotFoundResult",
            "BadRequestResult", "BadRequestObjectResult", "ObjectResult", "JsonResult",
            "ContentResult", "StatusCodeResult", "CreatedAtActionResult", "NoContentResult",
            "ProducesResponseType", "ProducesResponseTypeAttribute", "Produces",
            "ProducesAttribute", "Consumes", "ConsumesAttribute", "ProblemDetails",
            "ValidationProblemDetails", "NonAction", "NonActionAttribute", "Area",
            "AreaAttribute", "ApiExplorerSettings", "ApiExplorerSettingsAttribute",
        ],
        extension_methods: &[],
    },
];

/// Catalog of external namespaces consulted by the code-style analyzer
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [NamespaceEntry],
}

impl Catalog {
    /// The built-in catalog
    pub fn builtin() -> Self {
        Self { entries: CATALOG }
    }

    pub fn get(&self, namespace: &str) -> Option<&'static NamespaceEntry> {
        self.entries.iter().find(|e| e.namespace == namespace)
    }

    pub fn entries(&self) -> &'static [NamespaceEntry] {
        self.entries
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
