use crate::tests::test_utils::oil_of;

#[test]
fn global_initialized_in_entry_function() {
    insta::assert_snapshot!(oil_of("int x = 3 + 4;"), @r"
    int __x;
    void __ocmain (void)
    {
            int i1 = 3 + 4;
            __x = i1;
    }
    ");
}

#[test]
fn string_constants_are_shared() {
    insta::assert_snapshot!(oil_of("string a = \"hi\";\nstring b = \"hi\";\nstring c = \"yo\";"), @r#"
    char* s1 = "hi";
    char* s2 = "yo";
    char* __a;
    char* __b;
    char* __c;
    void __ocmain (void)
    {
            __a = s1;
            __b = s1;
            __c = s2;
    }
    "#);
}

#[test]
fn function_with_parameters() {
    insta::assert_snapshot!(oil_of("int add(int a, int b) { return a + b; }\nint r = add(1, 2);"), @r"
    int __r;
    int __add (
            int _1_a,
            int _1_b)
    {
            int i1 = _1_a + _1_b;
            return i1;
    }
    void __ocmain (void)
    {
            int i2 = __add (1, 2);
            __r = i2;
    }
    ");
}

#[test]
fn struct_allocation_and_field_store() {
    insta::assert_snapshot!(oil_of("struct pt { int x; int y; }\npt p = new pt();\np.x = 3;"), @r"
    struct s_pt {
            int f_pt_x;
            int f_pt_y;
    };
    struct s_pt* __p;
    void __ocmain (void)
    {
            struct s_pt* p1 = xcalloc (1, sizeof (struct s_pt));
            __p = p1;
            int* a2 = &__p->f_pt_x;
            (*a2) = 3;
    }
    ");
}

#[test]
fn array_allocation_and_indexing() {
    insta::assert_snapshot!(oil_of("int[] v = new int[3];\nv[0] = v[1];"), @r"
    int* __v;
    void __ocmain (void)
    {
            int* p1 = xcalloc (3, sizeof (int));
            __v = p1;
            int* a2 = &__v[0];
            int* a3 = &__v[1];
            (*a2) = (*a3);
    }
    ");
}

#[test]
fn unary_operators_and_conversions() {
    insta::assert_snapshot!(oil_of("int a = -(2);\nbool b = !true;\nint o = ord 'a';\nint z = 007;"), @r"
    int __a;
    char __b;
    int __o;
    int __z;
    void __ocmain (void)
    {
            int i1 = -2;
            __a = i1;
            char c2 = !1;
            __b = c2;
            int i3 = (int) 'a';
            __o = i3;
            __z = 7;
    }
    ");
}
